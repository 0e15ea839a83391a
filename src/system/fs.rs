// src/system/fs.rs

use std::fmt;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The filesystem operations the dispatch pipeline depends on.
///
/// Everything that touches the host goes through this trait so the resolution
/// and permission logic can be exercised against an in-memory fake.
pub trait FileSystem: fmt::Debug {
    /// The numeric identity of the user running the process.
    fn current_user(&self) -> u32;

    /// The owner of `path`, or `None` if its attributes cannot be read.
    fn owner(&self, path: &Path) -> Option<u32>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Whether the current user may write into `path`.
    fn is_writable(&self, path: &Path) -> bool;

    /// The filesystem root that `path` lives under.
    fn root_of(&self, path: &Path) -> PathBuf;

    /// Makes `path` absolute against the current directory.
    fn absolute_name(&self, path: &Path) -> io::Result<PathBuf>;

    /// Creates a fresh, uniquely named temporary directory and returns its path.
    fn make_temp_dir(&self, prefix: &str) -> io::Result<PathBuf>;

    /// Removes a file or a directory tree. Missing paths are not an error.
    fn delete(&self, path: &Path) -> io::Result<()>;

    /// The current working directory, or `None` if it no longer exists.
    fn current_dir(&self) -> Option<PathBuf>;
}

/// A shared handle to the filesystem, cheap to clone into deferred actions.
pub type SharedFs = Arc<dyn FileSystem>;

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl LocalFs {
    /// Returns the host filesystem as a [`SharedFs`].
    pub fn shared() -> SharedFs {
        Arc::new(Self)
    }
}

impl FileSystem for LocalFs {
    #[cfg(unix)]
    fn current_user(&self) -> u32 {
        nix::unistd::geteuid().as_raw()
    }

    #[cfg(not(unix))]
    fn current_user(&self) -> u32 {
        0
    }

    #[cfg(unix)]
    fn owner(&self, path: &Path) -> Option<u32> {
        use std::os::unix::fs::MetadataExt;
        fs::metadata(path).ok().map(|meta| meta.uid())
    }

    #[cfg(not(unix))]
    fn owner(&self, _path: &Path) -> Option<u32> {
        // No ownership model to compare against.
        None
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    #[cfg(unix)]
    fn is_writable(&self, path: &Path) -> bool {
        nix::unistd::access(path, nix::unistd::AccessFlags::W_OK).is_ok()
    }

    #[cfg(not(unix))]
    fn is_writable(&self, path: &Path) -> bool {
        fs::metadata(path)
            .map(|meta| !meta.permissions().readonly())
            .unwrap_or(false)
    }

    fn root_of(&self, path: &Path) -> PathBuf {
        match path.ancestors().last() {
            Some(root) if !root.as_os_str().is_empty() => root.to_path_buf(),
            _ => PathBuf::from(std::path::MAIN_SEPARATOR_STR),
        }
    }

    fn absolute_name(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = std::path::absolute(path)?;
        Ok(dunce::simplified(&absolute).to_path_buf())
    }

    fn make_temp_dir(&self, prefix: &str) -> io::Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-{}-", crate::constants::PROGRAM_NAME, prefix))
            .tempdir()?;
        Ok(dir.keep())
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        let result = match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) => Err(e),
        };
        match result {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok().filter(|dir| dir.exists())
    }
}

/// Whether the process runs with superuser privileges.
#[cfg(unix)]
pub fn is_superuser() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Whether the process runs with superuser privileges.
#[cfg(not(unix))]
pub fn is_superuser() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_temp_dir_and_delete() {
        let fs = LocalFs;
        let dir = fs.make_temp_dir("unit").unwrap();
        assert!(dir.is_dir());
        assert!(
            dir.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("rockport-unit-")
        );

        std::fs::write(dir.join("artifact.rock"), b"data").unwrap();
        fs.delete(&dir).unwrap();
        assert!(!dir.exists());

        // Deleting again is a no-op.
        fs.delete(&dir).unwrap();
    }

    #[test]
    fn test_root_of_absolute_and_relative() {
        let fs = LocalFs;
        assert_eq!(fs.root_of(Path::new("/opt/rocks/lib")), PathBuf::from("/"));
        assert_eq!(
            fs.root_of(Path::new("relative/dir")),
            PathBuf::from(std::path::MAIN_SEPARATOR_STR)
        );
    }

    #[test]
    fn test_absolute_name_keeps_absolute_paths() {
        let fs = LocalFs;
        let temp = TempDir::new().unwrap();
        let absolute = fs.absolute_name(temp.path()).unwrap();
        assert!(absolute.is_absolute());
        assert!(fs.absolute_name(Path::new("some/tree")).unwrap().is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_of_fresh_dir_is_current_user() {
        let fs = LocalFs;
        let temp = TempDir::new().unwrap();
        assert_eq!(fs.owner(temp.path()), Some(fs.current_user()));
        assert!(fs.is_writable(temp.path()));
        assert_eq!(fs.owner(&temp.path().join("missing")), None);
    }
}
