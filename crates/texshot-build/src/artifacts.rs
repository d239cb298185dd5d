use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file produced by the pipeline, such as the output JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    pub path: PathBuf,
}

impl FileArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Hex SHA-256 of the file contents, or `MISSING` if it cannot be read.
    pub fn fingerprint(&self) -> String {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                hex::encode(hasher.finalize())
            }
            Err(_) => "MISSING".to_string(),
        }
    }

    /// Deletes the file if present. Returns whether a file was removed.
    pub fn remove_if_exists(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_artifact_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("tex.jpg");
        fs::write(&file_path, "hello world").unwrap();

        let artifact = FileArtifact::new(file_path.clone());
        let fp1 = artifact.fingerprint();
        assert_eq!(
            fp1,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );

        fs::write(&file_path, "modified").unwrap();
        assert_ne!(artifact.fingerprint(), fp1);

        let _ = fs::remove_file(&file_path);
        assert_eq!(artifact.fingerprint(), "MISSING");
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = FileArtifact::new(dir.path().join("tex.jpg"));
        assert!(!artifact.remove_if_exists().unwrap());

        fs::write(artifact.path(), "stale").unwrap();
        assert!(artifact.exists());
        assert!(artifact.remove_if_exists().unwrap());
        assert!(!artifact.exists());
    }
}
