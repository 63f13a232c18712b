use std::path::{Path, PathBuf};

use crate::callback::PathCallback;
use crate::core::{DialogMode, ExtensionFilters, FileDialogError};
use crate::fs::FileSystem;
use crate::lister::{PathEntry, PathLister};

#[cfg(feature = "tracing")]
use tracing::debug;

/// State of the one live dialog interaction.
///
/// A session exists only between a request and its completion or
/// cancellation; `FileDialog` holds `None` while closed, so no field here is
/// ever read in the closed state.
#[derive(Debug)]
pub struct DialogSession {
    pub(crate) mode: DialogMode,
    pub(crate) title: String,
    pub(crate) current_path: PathBuf,
    pub(crate) filters: ExtensionFilters,
    pub(crate) active_extension: Option<String>,
    pub(crate) typed_text: String,
    pub(crate) entries: Vec<PathEntry>,
    pub(crate) pending_overwrite: Option<PathBuf>,
    pub(crate) navigation_candidate: Option<PathBuf>,
    pub(crate) notice: Option<FileDialogError>,
    pub(crate) callback: PathCallback,
}

impl DialogSession {
    pub(crate) fn new(
        mode: DialogMode,
        title: String,
        root: &Path,
        filters: ExtensionFilters,
        callback: PathCallback,
    ) -> Self {
        let active_extension = filters.default_extension().map(str::to_string);
        Self {
            mode,
            title,
            current_path: root.to_path_buf(),
            filters,
            active_extension,
            typed_text: String::new(),
            entries: Vec::new(),
            pending_overwrite: None,
            navigation_candidate: None,
            notice: None,
            callback,
        }
    }

    /// Active mode (never [`DialogMode::Closed`]).
    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    /// Title of the request.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Directory being browsed.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Accepted extensions for this request.
    pub fn filters(&self) -> &ExtensionFilters {
        &self.filters
    }

    /// Extension appended to save names, if any.
    pub fn active_extension(&self) -> Option<&str> {
        self.active_extension.as_deref()
    }

    /// Raw text the user is editing.
    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Listing of [`current_path`](Self::current_path).
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Whether an overwrite confirmation is blocking completion.
    pub fn pending_overwrite(&self) -> bool {
        self.pending_overwrite.is_some()
    }

    /// Target awaiting overwrite confirmation.
    pub fn pending_target(&self) -> Option<&Path> {
        self.pending_overwrite.as_deref()
    }

    /// Directory offered by the last unambiguous completion.
    pub fn navigation_candidate(&self) -> Option<&Path> {
        self.navigation_candidate.as_deref()
    }

    /// Last non-fatal condition (no match, invalid target, unreadable directory).
    pub fn notice(&self) -> Option<&FileDialogError> {
        self.notice.as_ref()
    }

    /// Move to `dir` and rebuild the listing.
    pub(crate) fn enter(
        &mut self,
        dir: PathBuf,
        fs: &dyn FileSystem,
        lister: PathLister,
        root: &Path,
    ) {
        self.current_path = dir;
        self.typed_text.clear();
        self.navigation_candidate = None;
        self.refresh(fs, lister, root);
    }

    /// Rebuild the listing of the current directory.
    ///
    /// An unreadable directory sends the session back to `root`. If the root
    /// itself cannot be read the listing is left empty. Either way the error
    /// is kept as the session notice and the session stays usable.
    pub(crate) fn refresh(&mut self, fs: &dyn FileSystem, lister: PathLister, root: &Path) {
        match lister.list(fs, &self.current_path, &self.filters) {
            Ok(entries) => {
                self.entries = entries;
            }
            Err(err) => {
                if self.current_path != root {
                    trace_listing_fallback(&self.current_path, root);
                    self.current_path = root.to_path_buf();
                    self.typed_text.clear();
                    self.navigation_candidate = None;
                    match lister.list(fs, root, &self.filters) {
                        Ok(entries) => {
                            self.entries = entries;
                            self.notice = Some(err);
                        }
                        Err(root_err) => {
                            self.entries.clear();
                            self.notice = Some(root_err);
                        }
                    }
                } else {
                    self.entries.clear();
                    self.notice = Some(err);
                }
            }
        }
    }
}

#[cfg(feature = "tracing")]
fn trace_listing_fallback(from: &Path, root: &Path) {
    debug!(
        event = "listing.fallback",
        from = %from.display(),
        root = %root.display(),
        "falling back to root directory"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_listing_fallback(_from: &Path, _root: &Path) {}
