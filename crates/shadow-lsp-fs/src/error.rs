use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("destination has no file name: '{0}'")]
    NoFileName(PathBuf),

    #[error("failed to create staged file '{path}': {source}")]
    Create {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to commit '{staged}' to '{destination}': {source}")]
    Commit {
        staged:      PathBuf,
        destination: PathBuf,
        source:      std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
