//! Byte loading from a rooted path.
//!
//! The "load bytes from a path" collaborator consumed by resource loaders.
//! Decoding (images, meshes) happens in the loader that asked for the bytes.

use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Reads raw asset bytes relative to a root directory.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Creates a source rooted at `path`. If `path` is a file, its parent
    /// directory becomes the root.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the file at `uri` (relative to the root) into memory.
    pub fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root.join(uri);
        log::trace!("reading {}", path.display());
        Ok(std::fs::read(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LumenError;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lumen-bytes-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_bytes_relative_to_the_root() {
        let dir = scratch_dir();
        std::fs::write(dir.join("blob.bin"), [1u8, 2, 3]).unwrap();
        let source = FileSource::new(&dir);
        assert_eq!(source.read_bytes("blob.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn file_path_roots_at_its_parent() {
        let dir = scratch_dir();
        let file = dir.join("scene.gltf");
        std::fs::write(&file, b"{}").unwrap();
        let source = FileSource::new(&file);
        assert_eq!(source.root(), dir.as_path());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = FileSource::new(scratch_dir());
        let err = source.read_bytes("not-there.bin").unwrap_err();
        assert!(matches!(err, LumenError::Io(_)));
    }
}
