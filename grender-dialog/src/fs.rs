use std::path::{Path, PathBuf};

/// Minimal metadata the dialog needs to validate a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FsMetadata {
    /// Whether the path refers to a directory (symlinks are followed).
    pub is_dir: bool,
}

/// Raw directory entry returned by [`FileSystem::read_dir`].
#[derive(Clone, Debug)]
pub struct FsEntry {
    /// Base name (no parent path)
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Whether this entry is a directory (symlinks to directories count).
    pub is_dir: bool,
}

/// File system abstraction used by the dialog.
///
/// Every call is synchronous and made on the thread driving the dialog. A
/// slow mount stalls the interaction; there is no background enumeration.
pub trait FileSystem {
    /// List the direct children of a directory.
    fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<FsEntry>>;
    /// Fetch metadata for a path, following symlinks.
    fn metadata(&self, path: &Path) -> std::io::Result<FsMetadata>;
    /// Canonicalize a path (best-effort absolute normalization).
    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf>;

    /// Whether the path currently exists.
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }

    /// Whether the path currently exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_dir).unwrap_or(false)
    }
}

/// Default filesystem implementation using `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<FsEntry>> {
        let mut out = Vec::new();
        let rd = std::fs::read_dir(dir)?;
        for e in rd {
            // Entries can vanish between readdir and stat; skip them.
            let e = match e {
                Ok(v) => v,
                Err(_) => continue,
            };
            let ft = match e.file_type() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let path = e.path();
            let is_dir = if ft.is_symlink() {
                std::fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                ft.is_dir()
            };
            out.push(FsEntry {
                name: e.file_name().to_string_lossy().to_string(),
                path,
                is_dir,
            });
        }
        Ok(out)
    }

    fn metadata(&self, path: &Path) -> std::io::Result<FsMetadata> {
        let md = std::fs::metadata(path)?;
        Ok(FsMetadata { is_dir: md.is_dir() })
    }

    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

#[cfg(test)]
pub(crate) mod test_fs {
    use std::cell::Cell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::{Path, PathBuf};

    use super::{FileSystem, FsEntry, FsMetadata};

    /// In-memory filesystem for driving the dialog core in unit tests.
    #[derive(Default)]
    pub(crate) struct TestFs {
        dirs: BTreeSet<PathBuf>,
        files: BTreeSet<PathBuf>,
        unreadable: BTreeSet<PathBuf>,
        pub(crate) read_dir_calls: Cell<usize>,
        pub(crate) metadata_calls: Cell<usize>,
    }

    impl TestFs {
        pub(crate) fn new(root: &str) -> Self {
            let mut fs = Self::default();
            fs.add_dir(root);
            fs
        }

        pub(crate) fn add_dir(&mut self, path: &str) -> &mut Self {
            self.dirs.insert(PathBuf::from(path));
            self
        }

        pub(crate) fn add_file(&mut self, path: &str) -> &mut Self {
            self.files.insert(PathBuf::from(path));
            self
        }

        pub(crate) fn remove(&mut self, path: &str) -> &mut Self {
            let p = PathBuf::from(path);
            self.dirs.retain(|d| !d.starts_with(&p));
            self.files.retain(|f| !f.starts_with(&p));
            self
        }

        pub(crate) fn deny(&mut self, path: &str) -> &mut Self {
            self.unreadable.insert(PathBuf::from(path));
            self
        }
    }

    impl FileSystem for TestFs {
        fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<FsEntry>> {
            self.read_dir_calls.set(self.read_dir_calls.get() + 1);
            if self.unreadable.contains(dir) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read_dir denied",
                ));
            }
            if !self.dirs.contains(dir) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such directory",
                ));
            }
            let child = |p: &PathBuf, is_dir: bool| {
                (p.parent() == Some(dir)).then(|| FsEntry {
                    name: p
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    path: p.clone(),
                    is_dir,
                })
            };
            let mut out: Vec<FsEntry> = self.files.iter().filter_map(|p| child(p, false)).collect();
            out.extend(self.dirs.iter().filter_map(|p| child(p, true)));
            Ok(out)
        }

        fn metadata(&self, path: &Path) -> std::io::Result<FsMetadata> {
            self.metadata_calls.set(self.metadata_calls.get() + 1);
            if self.dirs.contains(path) {
                Ok(FsMetadata { is_dir: true })
            } else if self.files.contains(path) {
                Ok(FsMetadata { is_dir: false })
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "not found"))
            }
        }

        fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
            Ok(path.to_path_buf())
        }
    }
}
