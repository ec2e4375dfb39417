use std::collections::BTreeSet;

use super::{TransformedResources, TransformerContext};
use crate::archive::EntrySink;
use crate::error::Result;

/// Updates the LSP library package to the relocated package in XML files given by name.
pub struct NamedFileTransformer {
    plugin_xml_files: BTreeSet<String>,
    resources:        TransformedResources,
}

impl NamedFileTransformer {
    pub fn new<I, S>(plugin_xml_files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            plugin_xml_files: plugin_xml_files.into_iter().map(Into::into).collect(),
            resources:        TransformedResources::new(),
        }
    }

    pub fn can_transform_resource(&self, path: &str) -> bool {
        self.plugin_xml_files.contains(path)
    }

    pub fn transform(&mut self, context: TransformerContext<'_>) -> Result<()> {
        let path = context.path.to_string();
        let patched = context.into_relocated_text()?;
        self.resources.insert(path, patched);
        Ok(())
    }

    pub fn has_transformed_resource(&self) -> bool {
        !self.resources.is_empty()
    }

    pub fn modify_output(&self, sink: &mut dyn EntrySink) -> Result<()> {
        for (path, xml) in self.resources.iter() {
            sink.put_entry(path, xml.as_bytes())?;
        }
        Ok(())
    }
}
