use std::fs::{File, Permissions};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A file written to `.<name>.tmp` next to its destination and moved over it
/// on commit.
pub struct StagedFile {
    staging_path:     PathBuf,
    destination_path: PathBuf,
    permissions:      Option<Permissions>,
    committed:        bool,
}

impl StagedFile {
    pub fn new(destination: impl AsRef<Path>) -> Result<Self> {
        let destination_path = destination.as_ref().to_path_buf();
        let file_name = destination_path
            .file_name()
            .ok_or_else(|| Error::NoFileName(destination_path.clone()))?
            .to_string_lossy();

        let staging_path = destination_path.with_file_name(format!(".{file_name}.tmp"));

        Ok(Self {
            staging_path,
            destination_path,
            permissions: None,
            committed: false,
        })
    }

    /// Permissions applied to the file right before it is moved into place.
    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Create (or truncate) the staged file, creating parent directories as needed.
    pub fn create(&self) -> Result<File> {
        if let Some(parent) = self.staging_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Create {
                    path:   parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        File::create(&self.staging_path).map_err(|e| Error::Create {
            path:   self.staging_path.clone(),
            source: e,
        })
    }

    pub fn path(&self) -> &Path { &self.staging_path }

    pub fn destination(&self) -> &Path { &self.destination_path }

    pub fn commit(mut self) -> Result<PathBuf> {
        if let Some(perms) = self.permissions.take() {
            std::fs::set_permissions(&self.staging_path, perms).map_err(|e| Error::Commit {
                staged:      self.staging_path.clone(),
                destination: self.destination_path.clone(),
                source:      e,
            })?;
        }

        std::fs::rename(&self.staging_path, &self.destination_path).map_err(|e| Error::Commit {
            staged:      self.staging_path.clone(),
            destination: self.destination_path.clone(),
            source:      e,
        })?;
        self.committed = true;

        Ok(self.destination_path.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.staging_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let dir = tempdir().unwrap();
        let staged = StagedFile::new(dir.path().join("plugin.jar")).unwrap();
        assert_eq!(staged.path(), dir.path().join(".plugin.jar.tmp"));
        assert_eq!(staged.destination(), dir.path().join("plugin.jar"));
    }

    #[test]
    fn test_commit_moves_content() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.jar");
        let staged = StagedFile::new(&dest).unwrap();
        let staging = staged.path().to_path_buf();

        let mut file = staged.create().unwrap();
        file.write_all(b"data").unwrap();
        drop(file);

        let committed = staged.commit().unwrap();
        assert_eq!(committed, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"data");
        assert!(!staging.exists());
    }

    #[test]
    fn test_cleanup_on_drop() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.jar");
        let staging;
        {
            let staged = StagedFile::new(&dest).unwrap();
            staging = staged.path().to_path_buf();
            staged.create().unwrap();
            assert!(staging.exists());
        }
        assert!(!staging.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_no_file_name() {
        let result = StagedFile::new("/");
        assert!(matches!(result, Err(Error::NoFileName(_))));
    }
}
