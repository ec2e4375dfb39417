//! Relocation of the `dev.j_a.ide` LSP and DAP client libraries bundled in a
//! plugin archive.
//!
//! The libraries are published under the module group
//! [`LSP_MODULE_GROUP`](constants::LSP_MODULE_GROUP) and keep all of their
//! classes below [`LSP_PACKAGE_PREFIX`](constants::LSP_PACKAGE_PREFIX). The
//! input is the plugin archive with those modules already merged in.
//!
//! A plugin embedding the libraries must move them into its own package so
//! that two plugins shipping different versions do not clash at runtime. This
//! crate rewrites the archive in one pass:
//!
//! - class files and entry paths under the source package are renamed,
//! - the LSP and DAP descriptors are renamed and receive one copy of their
//!   snippet template per enabled language,
//! - optionally, a named set of XML files is renamed as text.
//!
//! # Example
//!
//! ```no_run
//! use shadow_lsp_relocate::{RelocationRequest, relocate};
//!
//! let request = RelocationRequest::new("build/libs/my-plugin.jar", "com.example.plugin.lsp")
//!     .enabled_feature_ids(["rust"]);
//! let outcome = relocate(&request)?;
//! println!("wrote {}", outcome.output.display());
//! # Ok::<(), shadow_lsp_relocate::Error>(())
//! ```

pub mod archive;
mod class_file;
pub mod constants;
mod error;
mod orchestrator;
pub mod relocator;
mod request;
mod settings;
pub mod transformer;

pub use error::{Error, Result};
pub use orchestrator::{RelocationOutcome, relocate, relocators, transformers};
pub use relocator::{PackageRelocator, Relocator};
pub use request::RelocationRequest;
pub use settings::{ENV_PREFIX, SettingsOverrides, ShadowLspSettings};
