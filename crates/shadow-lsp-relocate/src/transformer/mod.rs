//! Resource transformers invoked by the archive assembler.
//!
//! The assembler offers every file entry to the registered transformers in
//! registration order. The first one claiming the path consumes the entry and
//! buffers its content; once all entries are read, every transformer writes
//! its buffered output. Each transformer owns a fresh [`TransformedResources`]
//! buffer, nothing is shared between instances.

mod descriptor;
mod named;
pub mod snippet;

pub use descriptor::DescriptorTransformer;
pub use named::NamedFileTransformer;

use crate::archive::EntrySink;
use crate::error::{Error, Result};
use crate::relocator::{self, Relocator};

/// The transformer strategies selectable by the orchestrator.
pub enum ResourceTransformer {
    /// Relocates the LSP/DAP descriptors and merges per-language snippets into them.
    SnippetMerge(DescriptorTransformer),
    /// Relocates an explicit set of files, without snippet handling.
    NamedFiles(NamedFileTransformer),
}

impl ResourceTransformer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SnippetMerge(_) => "snippet-merge",
            Self::NamedFiles(_) => "named-files",
        }
    }

    pub fn can_transform_resource(&self, path: &str) -> bool {
        match self {
            Self::SnippetMerge(t) => t.can_transform_resource(path),
            Self::NamedFiles(t) => t.can_transform_resource(path),
        }
    }

    pub fn transform(&mut self, context: TransformerContext<'_>) -> Result<()> {
        match self {
            Self::SnippetMerge(t) => t.transform(context),
            Self::NamedFiles(t) => t.transform(context),
        }
    }

    pub fn has_transformed_resource(&self) -> bool {
        match self {
            Self::SnippetMerge(t) => t.has_transformed_resource(),
            Self::NamedFiles(t) => t.has_transformed_resource(),
        }
    }

    pub fn modify_output(&self, sink: &mut dyn EntrySink) -> Result<()> {
        match self {
            Self::SnippetMerge(t) => t.modify_output(sink),
            Self::NamedFiles(t) => t.modify_output(sink),
        }
    }
}

impl From<DescriptorTransformer> for ResourceTransformer {
    fn from(value: DescriptorTransformer) -> Self {
        Self::SnippetMerge(value)
    }
}

impl From<NamedFileTransformer> for ResourceTransformer {
    fn from(value: NamedFileTransformer) -> Self {
        Self::NamedFiles(value)
    }
}

/// A claimed entry handed to a transformer.
pub struct TransformerContext<'a> {
    pub path:       &'a str,
    pub content:    Vec<u8>,
    pub relocators: &'a [Box<dyn Relocator>],
}

impl TransformerContext<'_> {
    /// Decode the content as UTF-8 and fold it through the relocators.
    pub fn into_relocated_text(self) -> Result<String> {
        let text = String::from_utf8(self.content).map_err(|source| Error::MalformedArchiveEntry {
            path: self.path.to_string(),
            source,
        })?;
        Ok(relocator::apply_all(self.relocators, text))
    }
}

/// Transformed text per archive path, in the order paths were first seen.
///
/// Inserting a path again replaces its content and keeps its position.
#[derive(Debug, Default, Clone)]
pub struct TransformedResources {
    entries: Vec<(String, String)>,
}

impl TransformedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: String) {
        let path = path.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = content,
            None => self.entries.push((path, content)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
