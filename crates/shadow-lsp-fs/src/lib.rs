//! Staged output files for archive assembly.
//!
//! An output archive is written to a hidden sibling of its destination and
//! only renamed into place once the writer has finished. Dropping an
//! uncommitted [`StagedFile`] removes the staged copy, so a failed run never
//! leaves a partial artifact behind.

mod error;
mod staged;

pub use error::{Error, Result};
pub use staged::StagedFile;
