use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("archive to relocate does not exist: '{0}'")]
    SourceArchiveMissing(PathBuf),

    #[error("not a zip archive: '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("archive entry '{path}' is not valid UTF-8: {source}")]
    MalformedArchiveEntry {
        path:   String,
        source: std::string::FromUtf8Error,
    },

    #[error("malformed class file '{path}': {reason}")]
    MalformedClassFile { path: String, reason: String },

    #[error("archive operation failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("staging operation failed: {source}")]
    Staging { source: shadow_lsp_fs::Error },

    #[error("failed to load settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<shadow_lsp_fs::Error> for Error {
    fn from(e: shadow_lsp_fs::Error) -> Self {
        Self::Staging { source: e }
    }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Settings(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
