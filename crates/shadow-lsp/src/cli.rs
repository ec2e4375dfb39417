use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use shadow_lsp_relocate::{SettingsOverrides, ShadowLspSettings, relocate};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "shadow-lsp")]
#[command(author, version, about = "Relocate the LSP and DAP client libraries bundled in a plugin archive", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rewrite an archive into its relocated counterpart
    Relocate(Relocate),
    /// Load and check the settings without touching any archive
    Validate(Validate),
}

impl Commands {
    pub fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Relocate(cmd) => cmd.run(),
            Self::Validate(cmd) => cmd.run(),
        }
    }
}

/// Options shared by every command, layered over the config file.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// TOML file with the settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Package the libraries are moved into
    #[arg(long)]
    pub package_prefix: Option<String>,

    /// Classifier appended to the output file name
    #[arg(long)]
    pub classifier: Option<String>,

    /// Language identifier to expand descriptor snippets for (repeatable)
    #[arg(long = "language-id", value_name = "ID")]
    pub language_ids: Vec<String>,

    /// Extra XML file inside the archive to relocate as text (repeatable)
    #[arg(long = "plugin-xml", value_name = "PATH")]
    pub plugin_xml_files: Vec<String>,

    /// Keep class files and entry paths in their original package
    #[arg(long)]
    pub no_relocate: bool,
}

impl SettingsArgs {
    fn load(self) -> anyhow::Result<ShadowLspSettings> {
        let overrides = SettingsOverrides {
            shadow_lsp_libraries: self.no_relocate.then_some(false),
            package_prefix:       self.package_prefix,
            archive_classifier:   self.classifier,
            enabled_language_ids: self.language_ids,
            plugin_xml_files:     self.plugin_xml_files,
        };

        ShadowLspSettings::load(self.config.as_deref(), &overrides).context("failed to load settings")
    }
}

#[derive(Debug, Args)]
pub struct Relocate {
    /// Archive produced by the plugin build
    pub archive: PathBuf,

    /// Write the result here instead of next to the input archive
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl Relocate {
    pub fn run(self) -> anyhow::Result<()> {
        let settings = self.settings.load()?;
        let Some(mut request) = settings
            .to_request(&self.archive)
            .context("invalid relocation settings")?
        else {
            return Ok(());
        };
        if let Some(output) = self.output {
            request = request.output_archive(output);
        }

        let outcome = relocate(&request)
            .with_context(|| format!("failed to relocate '{}'", self.archive.display()))?;

        info!(
            duplicates = outcome.report.duplicates.len(),
            "wrote {} entries",
            outcome.report.entries_written
        );
        println!("{}", outcome.output.display());
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct Validate {
    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl Validate {
    pub fn run(self) -> anyhow::Result<()> {
        let settings = self.settings.load()?;
        match settings
            .to_request("plugin.jar")
            .context("invalid relocation settings")?
        {
            Some(request) => println!(
                "ok: relocating into {} ({} language ids)",
                request.target_package_prefix,
                request.enabled_feature_ids.len()
            ),
            None => println!("ok: relocation disabled"),
        }
        Ok(())
    }
}
