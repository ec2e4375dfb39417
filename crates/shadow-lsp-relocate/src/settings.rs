//! User-facing options, layered with figment.
//!
//! Sources are merged in this order, later ones winning:
//! built-in defaults, an optional TOML file, `SHADOW_LSP_*` environment
//! variables and finally explicit overrides from the command line.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::DEFAULT_ARCHIVE_CLASSIFIER;
use crate::error::{Error, Result};
use crate::request::RelocationRequest;

pub const ENV_PREFIX: &str = "SHADOW_LSP_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowLspSettings {
    pub enabled:              bool,
    /// Whether the package rename runs at all.
    pub shadow_lsp_libraries: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_prefix:       Option<String>,
    pub archive_classifier:   String,
    pub enabled_language_ids: Vec<String>,
    pub plugin_xml_files:     Vec<String>,
}

impl Default for ShadowLspSettings {
    fn default() -> Self {
        Self {
            enabled:              true,
            shadow_lsp_libraries: true,
            package_prefix:       None,
            archive_classifier:   DEFAULT_ARCHIVE_CLASSIFIER.to_string(),
            enabled_language_ids: vec![],
            plugin_xml_files:     vec![],
        }
    }
}

/// Command line values. Unset fields leave the lower layers alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_lsp_libraries: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_prefix:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_classifier:   Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled_language_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugin_xml_files:     Vec<String>,
}

impl ShadowLspSettings {
    /// The merged provider chain, without extracting it.
    pub fn figment(config_file: Option<&Path>, overrides: &SettingsOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    /// Load the settings. An explicitly named config file must exist.
    pub fn load(config_file: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(Error::InvalidConfiguration(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
        }
        Ok(Self::figment(config_file, overrides).extract()?)
    }

    /// Turn the settings into a request for `source_archive`.
    ///
    /// Returns `None` when the step is disabled. The request is validated here
    /// so configuration errors surface before any archive is opened.
    pub fn to_request(&self, source_archive: impl Into<PathBuf>) -> Result<Option<RelocationRequest>> {
        if !self.enabled {
            info!("LSP library relocation disabled, skipping");
            return Ok(None);
        }

        let prefix = self.package_prefix.as_deref().ok_or_else(|| {
            Error::InvalidConfiguration("package_prefix must be set".to_string())
        })?;

        let request = RelocationRequest::new(source_archive, prefix)
            .output_classifier(&self.archive_classifier)
            .relocate_bytecode(self.shadow_lsp_libraries)
            .enabled_feature_ids(&self.enabled_language_ids)
            .named_xml_paths(&self.plugin_xml_files);
        request.validate()?;

        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ShadowLspSettings::default();
        assert!(settings.enabled);
        assert!(settings.shadow_lsp_libraries);
        assert_eq!(settings.archive_classifier, "shadowed");
        assert!(settings.package_prefix.is_none());
    }

    #[test]
    fn test_file_then_env_then_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "shadow-lsp.toml",
                r#"
                    package_prefix = "com.example.file"
                    archive_classifier = "from-file"
                    enabled_language_ids = ["python", "go"]
                "#,
            )?;
            jail.set_env("SHADOW_LSP_ARCHIVE_CLASSIFIER", "from-env");

            let path = Path::new("shadow-lsp.toml");
            let settings = ShadowLspSettings::load(Some(path), &SettingsOverrides::default())
                .map_err(|e| e.to_string())?;
            assert_eq!(settings.package_prefix.as_deref(), Some("com.example.file"));
            assert_eq!(settings.archive_classifier, "from-env");
            assert_eq!(settings.enabled_language_ids, vec!["python", "go"]);

            let overrides = SettingsOverrides {
                package_prefix: Some("com.example.cli".to_string()),
                archive_classifier: Some("from-cli".to_string()),
                ..Default::default()
            };
            let settings = ShadowLspSettings::load(Some(path), &overrides).map_err(|e| e.to_string())?;
            assert_eq!(settings.package_prefix.as_deref(), Some("com.example.cli"));
            assert_eq!(settings.archive_classifier, "from-cli");
            assert_eq!(settings.enabled_language_ids, vec!["python", "go"]);
            Ok(())
        });
    }

    #[test]
    fn test_empty_override_lists_keep_file_values() {
        Jail::expect_with(|jail| {
            jail.create_file("shadow-lsp.toml", r#"plugin_xml_files = ["META-INF/my-lsp.xml"]"#)?;
            let settings =
                ShadowLspSettings::load(Some(Path::new("shadow-lsp.toml")), &SettingsOverrides::default())
                    .map_err(|e| e.to_string())?;
            assert_eq!(settings.plugin_xml_files, vec!["META-INF/my-lsp.xml"]);
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file() {
        let result = ShadowLspSettings::load(
            Some(Path::new("/does/not/exist/shadow-lsp.toml")),
            &SettingsOverrides::default(),
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_disabled_produces_no_request() {
        let settings = ShadowLspSettings {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(settings.to_request("plugin.jar").unwrap(), None);
    }

    #[test]
    fn test_missing_prefix_is_rejected() {
        let settings = ShadowLspSettings::default();
        assert!(matches!(
            settings.to_request("plugin.jar"),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_request_carries_every_option() {
        let settings = ShadowLspSettings {
            shadow_lsp_libraries: false,
            package_prefix: Some("com.example.lsp".to_string()),
            archive_classifier: "relocated".to_string(),
            enabled_language_ids: vec!["rust".to_string()],
            plugin_xml_files: vec!["META-INF/extra.xml".to_string()],
            ..Default::default()
        };

        let request = settings.to_request("build/plugin.jar").unwrap().unwrap();
        assert_eq!(request.target_package_prefix, "com.example.lsp");
        assert_eq!(request.output_classifier, "relocated");
        assert!(!request.relocate_bytecode);
        assert_eq!(request.enabled_feature_ids, vec!["rust"]);
        assert_eq!(request.named_xml_paths, vec!["META-INF/extra.xml"]);
    }
}
