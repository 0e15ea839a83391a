// src/test_support.rs

//! In-memory doubles shared by the unit tests.

use crate::models::{Config, TreeSpec};
use crate::system::fs::FileSystem;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// The user id the fake runs as unless told otherwise.
pub(crate) const TEST_UID: u32 = 1000;

/// A fake filesystem. Directories exist only once registered; every other
/// query answers from the registered state.
#[derive(Debug)]
pub(crate) struct MemoryFs {
    uid: u32,
    existing: RefCell<BTreeSet<PathBuf>>,
    writable: RefCell<BTreeSet<PathBuf>>,
    owners: RefCell<BTreeMap<PathBuf, u32>>,
    cwd: RefCell<Option<PathBuf>>,
    temp_counter: Cell<u32>,
    deletes_fail: Cell<bool>,
    /// Temporary directories created so far.
    pub(crate) temp_dirs: RefCell<Vec<PathBuf>>,
    /// Paths passed to `delete`, in call order.
    pub(crate) deleted: RefCell<Vec<PathBuf>>,
    /// Number of filesystem queries answered.
    pub(crate) calls: Cell<u32>,
}

impl MemoryFs {
    /// An empty filesystem with `/` present and a working directory of `/work`.
    pub(crate) fn new() -> Self {
        let fs = Self {
            uid: TEST_UID,
            existing: RefCell::default(),
            writable: RefCell::default(),
            owners: RefCell::default(),
            cwd: RefCell::new(Some(PathBuf::from("/work"))),
            temp_counter: Cell::new(0),
            deletes_fail: Cell::new(false),
            temp_dirs: RefCell::default(),
            deleted: RefCell::default(),
            calls: Cell::new(0),
        };
        fs.add_dir("/", false);
        fs.add_dir("/work", true);
        fs
    }

    /// Registers a directory, optionally writable, owned by the current user.
    pub(crate) fn add_dir(&self, path: impl AsRef<Path>, writable: bool) {
        let path = path.as_ref().to_path_buf();
        if writable {
            self.writable.borrow_mut().insert(path.clone());
        }
        self.owners.borrow_mut().insert(path.clone(), self.uid);
        self.existing.borrow_mut().insert(path);
    }

    /// Overrides the owner of a registered path.
    pub(crate) fn set_owner(&self, path: impl AsRef<Path>, uid: u32) {
        self.owners
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), uid);
    }

    /// Makes a path unreadable: its owner can no longer be obtained.
    pub(crate) fn hide_owner(&self, path: impl AsRef<Path>) {
        self.owners.borrow_mut().remove(path.as_ref());
    }

    /// Changes the working directory; `None` means it was removed.
    pub(crate) fn set_cwd(&self, cwd: Option<&str>) {
        *self.cwd.borrow_mut() = cwd.map(PathBuf::from);
    }

    /// Makes every later `delete` fail with a permission error.
    pub(crate) fn fail_deletes(&self) {
        self.deletes_fail.set(true);
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFs {
    fn current_user(&self) -> u32 {
        self.tick();
        self.uid
    }

    fn owner(&self, path: &Path) -> Option<u32> {
        self.tick();
        self.owners.borrow().get(path).copied()
    }

    fn exists(&self, path: &Path) -> bool {
        self.tick();
        self.existing.borrow().contains(path)
    }

    fn is_writable(&self, path: &Path) -> bool {
        self.tick();
        self.writable.borrow().contains(path)
    }

    fn root_of(&self, _path: &Path) -> PathBuf {
        self.tick();
        PathBuf::from("/")
    }

    fn absolute_name(&self, path: &Path) -> io::Result<PathBuf> {
        self.tick();
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        match self.cwd.borrow().as_ref() {
            Some(cwd) => Ok(cwd.join(path)),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no working directory")),
        }
    }

    fn make_temp_dir(&self, prefix: &str) -> io::Result<PathBuf> {
        self.tick();
        let n = self.temp_counter.get() + 1;
        self.temp_counter.set(n);
        let dir = PathBuf::from(format!("/tmp/rockport-{}-{}", prefix, n));
        self.add_dir(&dir, true);
        self.temp_dirs.borrow_mut().push(dir.clone());
        Ok(dir)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        self.tick();
        if self.deletes_fail.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.existing
            .borrow_mut()
            .retain(|existing| !existing.starts_with(path));
        self.deleted.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.tick();
        self.cwd.borrow().clone()
    }
}

/// A configuration with the given plain-path trees, a home tree under
/// `/home/user` and a cache under the same home.
pub(crate) fn config_with_trees(trees: &[&str]) -> Config {
    Config {
        rocks_trees: trees
            .iter()
            .map(|tree| TreeSpec::Path(PathBuf::from(tree)))
            .collect(),
        home_tree: Some(PathBuf::from("/home/user/.rockport")),
        local_cache: PathBuf::from("/home/user/.cache/rockport"),
        ..Config::default()
    }
}
