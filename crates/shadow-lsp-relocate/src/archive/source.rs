use std::io::{Read, Seek};

use super::{ArchiveEntry, EntryKind};
use crate::error::Result;

/// Streams the entries of a zip archive in central-directory order.
pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    index:   usize,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)?;
        Ok(Self { archive, index: 0 })
    }

    fn read_entry(&mut self, index: usize) -> Result<ArchiveEntry> {
        let mut file = self.archive.by_index(index)?;

        let kind = if file.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let mut content = Vec::with_capacity(file.size() as usize);
        if kind == EntryKind::File {
            file.read_to_end(&mut content)?;
        }

        Ok(ArchiveEntry {
            path: file.name().to_string(),
            kind,
            content,
            last_modified: file.last_modified(),
            unix_mode: file.unix_mode(),
        })
    }
}

impl<R: Read + Seek> Iterator for ZipSource<R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.archive.len() {
            return None;
        }

        let index = self.index;
        self.index += 1;
        Some(self.read_entry(index))
    }
}
