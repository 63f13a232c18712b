use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::core::{ExtensionFilters, FileDialogError};
use crate::fs::{FileSystem, FsEntry};

#[cfg(feature = "tracing")]
use tracing::{trace, warn};

/// One item of a directory listing.
///
/// Entries are immutable; every refresh builds a new list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

impl PathEntry {
    pub(crate) fn new(name: impl Into<String>, path: PathBuf, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            path,
            is_dir,
        }
    }

    /// Base name (no parent path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Label used by the default renderers (directories get a trailing `/`).
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Produces the filtered, ordered listing of one directory.
///
/// Only direct children are enumerated. Directories are always kept; files
/// are kept when they pass the extension filter. The result is sorted
/// directories first, then files, each group by case-insensitive name.
#[derive(Clone, Copy, Debug)]
pub struct PathLister {
    /// Keep dot-prefixed entries.
    pub show_hidden: bool,
    /// Drop every file (directory pickers).
    pub directories_only: bool,
}

impl Default for PathLister {
    fn default() -> Self {
        Self {
            show_hidden: true,
            directories_only: false,
        }
    }
}

impl PathLister {
    /// List `dir` through `fs`.
    ///
    /// Fails with [`FileDialogError::Filesystem`] when the directory cannot
    /// be read; no partial listing is returned in that case.
    pub fn list(
        &self,
        fs: &dyn FileSystem,
        dir: &Path,
        filters: &ExtensionFilters,
    ) -> Result<Vec<PathEntry>, FileDialogError> {
        let raw = match fs.read_dir(dir) {
            Ok(v) => v,
            Err(err) => {
                trace_listing_failed(dir, &err);
                return Err(FileDialogError::filesystem(dir, err));
            }
        };

        let mut entries: Vec<PathEntry> = raw
            .into_iter()
            .filter_map(|e| sanitize_entry(e, dir))
            .filter(|e| self.keep(e, filters))
            .map(|e| PathEntry::new(e.name, e.path, e.is_dir))
            .collect();
        sort_entries_in_place(&mut entries);

        trace_listing_completed(dir, entries.len());
        Ok(entries)
    }

    fn keep(&self, e: &FsEntry, filters: &ExtensionFilters) -> bool {
        if !self.show_hidden && e.name.starts_with('.') {
            return false;
        }
        if e.is_dir {
            return true;
        }
        !self.directories_only && filters.matches(&e.name)
    }
}

/// Directories first, then case-insensitive by name.
///
/// Names that differ only by case fall back to a byte comparison so the
/// order stays total and deterministic.
fn compare_entries(a: &PathEntry, b: &PathEntry) -> Ordering {
    if a.is_dir != b.is_dir {
        return b.is_dir.cmp(&a.is_dir);
    }
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

fn sort_entries_in_place(entries: &mut [PathEntry]) {
    entries.sort_by(compare_entries);
}

fn sanitize_entry(mut entry: FsEntry, dir: &Path) -> Option<FsEntry> {
    if entry.name.trim().is_empty() {
        entry.name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())?;
    }
    if entry.path.as_os_str().is_empty() || !entry.path.is_absolute() {
        entry.path = dir.join(&entry.name);
    }
    Some(entry)
}

#[cfg(feature = "tracing")]
fn trace_listing_completed(dir: &Path, entries: usize) {
    trace!(
        event = "listing.completed",
        dir = %dir.display(),
        entries,
        "directory listed"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_listing_completed(_dir: &Path, _entries: usize) {}

#[cfg(feature = "tracing")]
fn trace_listing_failed(dir: &Path, err: &std::io::Error) {
    warn!(
        event = "listing.failed",
        dir = %dir.display(),
        error = %err,
        "directory listing failed"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_listing_failed(_dir: &Path, _err: &std::io::Error) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::test_fs::TestFs;

    fn names(entries: &[PathEntry]) -> Vec<String> {
        entries.iter().map(PathEntry::display_name).collect()
    }

    fn docs_fs() -> TestFs {
        let mut fs = TestFs::new("/docs");
        fs.add_file("/docs/notes.txt")
            .add_file("/docs/Notes2.txt")
            .add_file("/docs/cover.PNG")
            .add_file("/docs/.hidden.txt")
            .add_dir("/docs/img")
            .add_dir("/docs/Archive");
        fs
    }

    #[test]
    fn directories_first_then_case_insensitive_names() {
        let fs = docs_fs();
        let entries = PathLister::default()
            .list(&fs, Path::new("/docs"), &ExtensionFilters::default())
            .unwrap();
        assert_eq!(
            names(&entries),
            vec![
                "Archive/",
                "img/",
                ".hidden.txt",
                "cover.PNG",
                "notes.txt",
                "Notes2.txt"
            ]
        );
        assert!(entries.iter().all(|e| e.path().starts_with("/docs")));
    }

    #[test]
    fn filter_keeps_all_directories_and_matching_files() {
        let fs = docs_fs();
        let filters = ExtensionFilters::new([".png"]);
        let entries = PathLister::default()
            .list(&fs, Path::new("/docs"), &filters)
            .unwrap();
        assert_eq!(names(&entries), vec!["Archive/", "img/", "cover.PNG"]);
    }

    #[test]
    fn directories_only_and_hidden_toggles() {
        let fs = docs_fs();
        let lister = PathLister {
            show_hidden: false,
            directories_only: true,
        };
        let entries = lister
            .list(&fs, Path::new("/docs"), &ExtensionFilters::default())
            .unwrap();
        assert_eq!(names(&entries), vec!["Archive/", "img/"]);

        let lister = PathLister {
            show_hidden: false,
            directories_only: false,
        };
        let entries = lister
            .list(&fs, Path::new("/docs"), &ExtensionFilters::new(["txt"]))
            .unwrap();
        assert_eq!(
            names(&entries),
            vec!["Archive/", "img/", "notes.txt", "Notes2.txt"]
        );
    }

    #[test]
    fn names_differing_only_by_case_have_a_stable_order() {
        let mut fs = TestFs::new("/d");
        fs.add_file("/d/readme").add_file("/d/README");
        let entries = PathLister::default()
            .list(&fs, Path::new("/d"), &ExtensionFilters::default())
            .unwrap();
        assert_eq!(names(&entries), vec!["README", "readme"]);
    }

    #[test]
    fn every_listing_reads_the_directory_afresh() {
        let mut fs = docs_fs();
        let lister = PathLister::default();
        let all = ExtensionFilters::default();
        assert_eq!(lister.list(&fs, Path::new("/docs"), &all).unwrap().len(), 6);
        fs.add_file("/docs/late.txt");
        assert_eq!(lister.list(&fs, Path::new("/docs"), &all).unwrap().len(), 7);
        assert_eq!(fs.read_dir_calls.get(), 2);
    }

    #[test]
    fn unreadable_directory_is_a_filesystem_error() {
        let mut fs = docs_fs();
        fs.deny("/docs/img");
        let err = PathLister::default()
            .list(&fs, Path::new("/docs/img"), &ExtensionFilters::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FileDialogError::Filesystem { ref path, .. } if path == Path::new("/docs/img")
        ));

        let err = PathLister::default()
            .list(&fs, Path::new("/docs/missing"), &ExtensionFilters::default())
            .unwrap_err();
        assert!(matches!(err, FileDialogError::Filesystem { .. }));
    }
}
