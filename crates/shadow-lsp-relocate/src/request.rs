use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_ARCHIVE_CLASSIFIER, LSP_PACKAGE_PREFIX};
use crate::error::{Error, Result};

/// Everything one relocation run needs, fixed before any archive I/O.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelocationRequest {
    pub source_archive:        PathBuf,
    pub output_classifier:     String,
    pub output_archive:        Option<PathBuf>,
    pub target_package_prefix: String,
    pub relocate_bytecode:     bool,
    pub enabled_feature_ids:   Vec<String>,
    pub named_xml_paths:       Vec<String>,
}

impl RelocationRequest {
    pub fn new(source_archive: impl Into<PathBuf>, target_package_prefix: impl Into<String>) -> Self {
        Self {
            source_archive:        source_archive.into(),
            output_classifier:     DEFAULT_ARCHIVE_CLASSIFIER.to_string(),
            output_archive:        None,
            target_package_prefix: target_package_prefix.into(),
            relocate_bytecode:     true,
            enabled_feature_ids:   vec![],
            named_xml_paths:       vec![],
        }
    }

    pub fn output_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.output_classifier = classifier.into();
        self
    }

    pub fn output_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_archive = Some(path.into());
        self
    }

    pub fn relocate_bytecode(mut self, relocate: bool) -> Self {
        self.relocate_bytecode = relocate;
        self
    }

    /// Feature IDs keep the given order; repeated IDs are dropped.
    pub fn enabled_feature_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_feature_ids = unique(ids);
        self
    }

    pub fn named_xml_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.named_xml_paths = unique(paths);
        self
    }

    /// Check the target package. Must pass before any archive is touched.
    pub fn validate(&self) -> Result<()> {
        let prefix = self.target_package_prefix.as_str();
        if prefix.is_empty() || prefix == LSP_PACKAGE_PREFIX {
            return Err(Error::InvalidConfiguration(format!(
                "packagePrefix must be set to a non-empty value different from {LSP_PACKAGE_PREFIX}"
            )));
        }
        Ok(())
    }

    /// The explicit output path, or `<stem>-<classifier>.<ext>` next to the source.
    pub fn output_path(&self) -> Result<PathBuf> {
        let output = match &self.output_archive {
            Some(path) => path.clone(),
            None => derive_output_path(&self.source_archive, &self.output_classifier)?,
        };

        if output == self.source_archive {
            return Err(Error::InvalidConfiguration(format!(
                "output archive '{}' would overwrite the source archive",
                output.display()
            )));
        }
        Ok(output)
    }
}

fn derive_output_path(source: &Path, classifier: &str) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| {
            Error::InvalidConfiguration(format!("'{}' has no file name", source.display()))
        })?
        .to_string_lossy();

    let mut name = stem.into_owned();
    if !classifier.is_empty() {
        name.push('-');
        name.push_str(classifier);
    }
    if let Some(extension) = source.extension() {
        name.push('.');
        name.push_str(&extension.to_string_lossy());
    }

    Ok(source.with_file_name(name))
}

fn unique<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = Vec::new();
    for item in items {
        let item = item.into();
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
