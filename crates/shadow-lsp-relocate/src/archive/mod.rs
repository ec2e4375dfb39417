//! Archive assembly: reading the source archive, offering entries to the
//! transformers and writing the relocated output.
//!
//! # Architecture
//!
//! - `detect.rs` - Zip signature check
//! - `source.rs` - Entry stream over the input archive
//! - `assemble.rs` - Single-pass assembly into a staged output archive

mod assemble;
mod detect;
mod source;

pub use assemble::{ArchiveAssembler, AssemblyReport};
pub use detect::{is_zip, is_zip_file};
pub use source::ZipSource;

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// An entry read from the source archive, content fully buffered.
#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    pub path:          String,
    pub kind:          EntryKind,
    pub content:       Vec<u8>,
    pub last_modified: Option<zip::DateTime>,
    pub unix_mode:     Option<u32>,
}

impl ArchiveEntry {
    pub fn is_class_file(&self) -> bool {
        self.kind == EntryKind::File && self.path.ends_with(".class")
    }
}

/// Receives entries produced by transformers at finalize time.
pub trait EntrySink {
    fn put_entry(&mut self, path: &str, content: &[u8]) -> Result<()>;
}
