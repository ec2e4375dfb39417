use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::Path;

use shadow_lsp_fs::StagedFile;
use tracing::{debug, trace, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ArchiveEntry, EntryKind, EntrySink, ZipSource};
use crate::class_file::relocate_class;
use crate::error::Result;
use crate::relocator::{self, Relocator};
use crate::transformer::{ResourceTransformer, TransformerContext};

/// Counters collected during one assembly pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub entries_read:      usize,
    pub entries_written:   usize,
    pub relocated_classes: usize,
    pub relocated_paths:   usize,
    /// Paths consumed by a transformer, in archive order.
    pub transformed:       Vec<String>,
    /// Output paths dropped because an earlier entry already wrote them.
    pub duplicates:        Vec<String>,
}

/// Single-pass archive assembly.
///
/// Entries are offered to the transformers in registration order; the first
/// transformer claiming a path consumes it. Unclaimed entries are copied with
/// relocated paths and class files. Transformer output is written last.
pub struct ArchiveAssembler {
    relocators:   Vec<Box<dyn Relocator>>,
    transformers: Vec<ResourceTransformer>,
}

impl ArchiveAssembler {
    pub fn new(relocators: Vec<Box<dyn Relocator>>) -> Self {
        Self {
            relocators,
            transformers: vec![],
        }
    }

    /// Register a transformer after all previously registered ones.
    pub fn transform(mut self, transformer: impl Into<ResourceTransformer>) -> Self {
        self.transformers.push(transformer.into());
        self
    }

    /// Assemble `source` into `destination`.
    ///
    /// The output is staged next to `destination` and only moved into place
    /// once the archive is complete, with the permissions of `source`. On
    /// error nothing is left behind.
    pub fn assemble(mut self, source: &Path, destination: &Path) -> Result<AssemblyReport> {
        let file = File::open(source)?;
        let permissions = file.metadata()?.permissions();
        let entries = ZipSource::new(BufReader::new(file))?;
        let staged = StagedFile::new(destination)?.permissions(permissions);
        let mut sink = ZipSink::new(BufWriter::new(staged.create()?));
        let mut report = AssemblyReport::default();

        for entry in entries {
            let entry = entry?;
            report.entries_read += 1;
            self.process(entry, &mut sink, &mut report)?;
        }

        for transformer in &self.transformers {
            if transformer.has_transformed_resource() {
                debug!(transformer = transformer.name(), "writing transformed resources");
                transformer.modify_output(&mut sink)?;
            }
        }

        report.entries_written = sink.written.len();
        report.duplicates = std::mem::take(&mut sink.duplicates);

        let mut writer = sink.finish()?;
        writer.flush()?;
        drop(writer);
        staged.commit()?;

        Ok(report)
    }

    fn process<W: Write + Seek>(
        &mut self,
        entry: ArchiveEntry,
        sink: &mut ZipSink<W>,
        report: &mut AssemblyReport,
    ) -> Result<()> {
        if entry.kind == EntryKind::File {
            if let Some(transformer) = self
                .transformers
                .iter_mut()
                .find(|t| t.can_transform_resource(&entry.path))
            {
                trace!(path = %entry.path, transformer = transformer.name(), "claimed");
                transformer.transform(TransformerContext {
                    path:       &entry.path,
                    content:    entry.content,
                    relocators: &self.relocators,
                })?;
                report.transformed.push(entry.path);
                return Ok(());
            }
        }

        let path = match relocator::relocate_path_all(&self.relocators, &entry.path) {
            Some(relocated) => {
                report.relocated_paths += 1;
                relocated
            }
            None => entry.path.clone(),
        };

        match entry.kind {
            EntryKind::Directory => sink.put_directory(&path, &entry),
            EntryKind::File => {
                let content = if entry.is_class_file() {
                    match relocate_class(&entry.path, &entry.content, &self.relocators)? {
                        Some(relocated) => {
                            report.relocated_classes += 1;
                            Cow::Owned(relocated)
                        }
                        None => Cow::Borrowed(entry.content.as_slice()),
                    }
                } else {
                    Cow::Borrowed(entry.content.as_slice())
                };
                trace!(from = %entry.path, to = %path, "copied");
                sink.put_file(&path, &content, &entry)
            }
        }
    }
}

/// Output zip stream that keeps the first entry written for each path.
struct ZipSink<W: Write + Seek> {
    writer:     ZipWriter<W>,
    written:    HashSet<String>,
    duplicates: Vec<String>,
}

impl<W: Write + Seek> ZipSink<W> {
    fn new(inner: W) -> Self {
        Self {
            writer:     ZipWriter::new(inner),
            written:    HashSet::new(),
            duplicates: vec![],
        }
    }

    fn accept(&mut self, path: &str) -> bool {
        if self.written.insert(path.to_string()) {
            return true;
        }
        warn!(path, "duplicate archive entry dropped, keeping the first one");
        self.duplicates.push(path.to_string());
        false
    }

    fn options(entry: Option<&ArchiveEntry>) -> SimpleFileOptions {
        let mut options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        if let Some(entry) = entry {
            if let Some(modified) = entry.last_modified {
                options = options.last_modified_time(modified);
            }
            if let Some(mode) = entry.unix_mode {
                options = options.unix_permissions(mode);
            }
        }
        options
    }

    fn put_file(&mut self, path: &str, content: &[u8], entry: &ArchiveEntry) -> Result<()> {
        if !self.accept(path) {
            return Ok(());
        }
        self.writer.start_file(path, Self::options(Some(entry)))?;
        self.writer.write_all(content)?;
        Ok(())
    }

    fn put_directory(&mut self, path: &str, entry: &ArchiveEntry) -> Result<()> {
        if !self.accept(path) {
            return Ok(());
        }
        self.writer.add_directory(path, Self::options(Some(entry)))?;
        Ok(())
    }

    fn finish(self) -> Result<W> {
        Ok(self.writer.finish()?)
    }
}

impl<W: Write + Seek> EntrySink for ZipSink<W> {
    fn put_entry(&mut self, path: &str, content: &[u8]) -> Result<()> {
        if !self.accept(path) {
            return Ok(());
        }
        self.writer.start_file(path, Self::options(None))?;
        self.writer.write_all(content)?;
        Ok(())
    }
}
