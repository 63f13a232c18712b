use std::path::{Component, Path, PathBuf};

use crate::callback::PathCallback;
use crate::completion::{Completion, CompletionEngine};
use crate::core::{DialogConfig, DialogMode, ExtensionFilters, ExtensionPolicy, FileDialogError};
use crate::frontend::{DialogFrontend, DialogView};
use crate::fs::{FileSystem, StdFileSystem};
use crate::lister::{PathEntry, PathLister};
use crate::overwrite::{OverwriteDecision, OverwriteGuard};
use crate::session::DialogSession;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// User gesture delivered by the host for the live session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogEvent {
    /// Replace the text input contents.
    SetText(String),
    /// Complete the text input against the current listing (Tab).
    Complete,
    /// Enter the directory offered by the last unambiguous completion.
    NavigateCandidate,
    /// Select a listed entry by index: directories are entered, files
    /// become the typed name.
    SelectEntry(usize),
    /// Move to the parent directory (never above the root).
    NavigateUp,
    /// Jump to a directory inside the root (absolute, or relative to the
    /// current directory).
    NavigateTo(PathBuf),
    /// Choose the extension appended to save names.
    SetActiveExtension(String),
    /// Re-read the current directory.
    Refresh,
    /// Confirm the dialog (Open/Save button, Enter).
    Confirm,
    /// Accept the overwrite prompt.
    ConfirmOverwrite,
    /// Decline the overwrite prompt and keep editing.
    RejectOverwrite,
    /// Cancel button or Escape.
    Cancel,
    /// Window-close gesture; same effect as [`DialogEvent::Cancel`].
    Close,
}

/// What an accepted [`DialogEvent`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Session state changed without navigation.
    Updated,
    /// The current directory changed (possibly to the root after a fallback).
    Navigated(PathBuf),
    /// A file entry was selected.
    Selected(PathEntry),
    /// Completion ran; the text input now holds the completed text.
    Completed(Completion),
    /// The save target exists; waiting for the overwrite prompt.
    OverwritePending(PathBuf),
    /// The overwrite prompt was declined; editing resumes.
    OverwriteRejected,
    /// The callback ran with this path and the session closed.
    Finished(PathBuf),
    /// The session was discarded without running the callback.
    Cancelled,
}

#[derive(Clone, Copy, Debug)]
enum CloseReason {
    Completed,
    Cancelled,
    WindowClosed,
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
impl CloseReason {
    fn as_str(self) -> &'static str {
        match self {
            CloseReason::Completed => "completed",
            CloseReason::Cancelled => "cancelled",
            CloseReason::WindowClosed => "window_closed",
        }
    }
}

/// Owner of the application's single dialog session.
///
/// The application creates one `FileDialog` at startup, anchored at a root
/// directory, and passes it by reference to wherever dialogs are requested.
/// At most one session is live at a time; a request while one is live fails
/// with [`FileDialogError::SessionBusy`] and leaves the live session alone.
///
/// ```no_run
/// use grender_dialog::{DialogConfig, DialogEvent, FileDialog};
///
/// let mut dialog = FileDialog::new(DialogConfig::new("/srv/assets"));
/// dialog
///     .request_open_file("Open image", ["png", "jpg"], |path: &std::path::Path| {
///         println!("picked {}", path.display());
///     })
///     .unwrap();
///
/// // Per frame, the renderer reports gestures:
/// dialog.handle_event(DialogEvent::SetText("cover.png".into())).ok();
/// dialog.handle_event(DialogEvent::Confirm).ok();
/// assert!(!dialog.is_active());
/// ```
pub struct FileDialog {
    fs: Box<dyn FileSystem>,
    root: PathBuf,
    show_hidden: bool,
    extension_policy: ExtensionPolicy,
    session: Option<DialogSession>,
}

impl std::fmt::Debug for FileDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDialog")
            .field("root", &self.root)
            .field("show_hidden", &self.show_hidden)
            .field("extension_policy", &self.extension_policy)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl FileDialog {
    /// Create a dialog owner backed by the real filesystem.
    pub fn new(config: DialogConfig) -> Self {
        Self::with_fs(config, StdFileSystem)
    }

    /// Create a dialog owner backed by a custom filesystem.
    ///
    /// The root is canonicalized when possible and stays fixed afterwards.
    pub fn with_fs(config: DialogConfig, fs: impl FileSystem + 'static) -> Self {
        let root = fs.canonicalize(&config.root).unwrap_or(config.root);
        Self {
            fs: Box::new(fs),
            root,
            show_hidden: config.show_hidden,
            extension_policy: config.extension_policy,
            session: None,
        }
    }

    /// Anchor directory of every session.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a session is live.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current mode ([`DialogMode::Closed`] when no session is live).
    pub fn mode(&self) -> DialogMode {
        self.session
            .as_ref()
            .map(DialogSession::mode)
            .unwrap_or(DialogMode::Closed)
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&DialogSession> {
        self.session.as_ref()
    }

    /// Snapshot for the renderer, `None` while closed.
    pub fn view(&self) -> Option<DialogView<'_>> {
        self.session
            .as_ref()
            .map(|s| DialogView::new(s, &self.root))
    }

    /// Ask the user for a directory.
    pub fn request_open_directory<F>(
        &mut self,
        title: impl Into<String>,
        callback: F,
    ) -> Result<(), FileDialogError>
    where
        F: FnOnce(&Path) + 'static,
    {
        self.open(
            DialogMode::OpenDirectory,
            title.into(),
            ExtensionFilters::default(),
            PathCallback::new(callback),
        )
    }

    /// Ask the user for an existing file. An empty extension list accepts
    /// every file.
    pub fn request_open_file<I, S, F>(
        &mut self,
        title: impl Into<String>,
        extensions: I,
        callback: F,
    ) -> Result<(), FileDialogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce(&Path) + 'static,
    {
        self.open(
            DialogMode::OpenFile,
            title.into(),
            ExtensionFilters::new(extensions),
            PathCallback::new(callback),
        )
    }

    /// Ask the user for a file name to save to. The first plain extension
    /// becomes the active one.
    pub fn request_save_file<I, S, F>(
        &mut self,
        title: impl Into<String>,
        extensions: I,
        callback: F,
    ) -> Result<(), FileDialogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce(&Path) + 'static,
    {
        self.open(
            DialogMode::SaveFile,
            title.into(),
            ExtensionFilters::new(extensions),
            PathCallback::new(callback),
        )
    }

    /// Discard the live session without running its callback.
    ///
    /// Returns `false` when no session was live.
    pub fn cancel(&mut self) -> bool {
        self.close(CloseReason::Cancelled)
    }

    /// Run one interaction frame: hand the view to `frontend`, then apply the
    /// gestures it returns in order. Gestures after the session closes are
    /// dropped. Returns the result of every applied gesture.
    pub fn frame(
        &mut self,
        frontend: &mut dyn DialogFrontend,
    ) -> Vec<Result<DialogOutcome, FileDialogError>> {
        let events = match self.view() {
            Some(view) => frontend.draw(&view),
            None => return Vec::new(),
        };
        let mut results = Vec::with_capacity(events.len());
        for event in events {
            if !self.is_active() {
                break;
            }
            results.push(self.handle_event(event));
        }
        results
    }

    /// Apply one gesture to the live session.
    ///
    /// An `Err` means the gesture was rejected and the session is unchanged
    /// apart from its notice; no error ever closes the session.
    pub fn handle_event(&mut self, event: DialogEvent) -> Result<DialogOutcome, FileDialogError> {
        let session = self.session.as_ref().ok_or(FileDialogError::NotActive)?;
        let pending = session.pending_overwrite.is_some();

        let result = match event {
            DialogEvent::Cancel => {
                self.close(CloseReason::Cancelled);
                return Ok(DialogOutcome::Cancelled);
            }
            DialogEvent::Close => {
                self.close(CloseReason::WindowClosed);
                return Ok(DialogOutcome::Cancelled);
            }
            DialogEvent::ConfirmOverwrite => self.confirm_overwrite(),
            DialogEvent::RejectOverwrite => self.reject_overwrite(),
            _ if pending => Err(FileDialogError::invalid(
                "overwrite confirmation is pending",
            )),
            DialogEvent::SetText(text) => {
                let s = self.live_mut()?;
                s.typed_text = text;
                s.navigation_candidate = None;
                s.notice = None;
                Ok(DialogOutcome::Updated)
            }
            DialogEvent::Complete => self.complete(),
            DialogEvent::NavigateCandidate => self.navigate_candidate(),
            DialogEvent::SelectEntry(index) => self.select_entry(index),
            DialogEvent::NavigateUp => self.navigate_up(),
            DialogEvent::NavigateTo(path) => self.navigate_to(path),
            DialogEvent::SetActiveExtension(ext) => self.set_active_extension(&ext),
            DialogEvent::Refresh => {
                self.live_mut()?.notice = None;
                self.refresh();
                Ok(DialogOutcome::Updated)
            }
            DialogEvent::Confirm => self.confirm(),
        };

        if let Err(err) = &result {
            self.note(err);
        }
        result
    }

    fn open(
        &mut self,
        mode: DialogMode,
        title: String,
        filters: ExtensionFilters,
        callback: PathCallback,
    ) -> Result<(), FileDialogError> {
        if self.session.is_some() {
            trace_session_rejected(mode);
            return Err(FileDialogError::SessionBusy);
        }
        trace_session_opened(mode, &title, &self.root);
        self.session = Some(DialogSession::new(
            mode, title, &self.root, filters, callback,
        ));
        self.refresh();
        Ok(())
    }

    fn close(&mut self, reason: CloseReason) -> bool {
        match self.session.take() {
            Some(session) => {
                trace_session_closed(session.mode, reason);
                true
            }
            None => false,
        }
    }

    /// Close the session, then hand `path` to its callback.
    fn finish(&mut self, path: PathBuf) -> Result<DialogOutcome, FileDialogError> {
        let session = self.session.take().ok_or(FileDialogError::NotActive)?;
        trace_session_closed(session.mode, CloseReason::Completed);
        session.callback.invoke(&path);
        Ok(DialogOutcome::Finished(path))
    }

    fn live(&self) -> Result<&DialogSession, FileDialogError> {
        self.session.as_ref().ok_or(FileDialogError::NotActive)
    }

    fn live_mut(&mut self) -> Result<&mut DialogSession, FileDialogError> {
        self.session.as_mut().ok_or(FileDialogError::NotActive)
    }

    fn lister(&self) -> PathLister {
        PathLister {
            show_hidden: self.show_hidden,
            directories_only: self.mode().directories_only(),
        }
    }

    fn note(&mut self, err: &FileDialogError) {
        let notice = match err {
            FileDialogError::InvalidTarget(msg) => FileDialogError::InvalidTarget(msg.clone()),
            FileDialogError::NoMatch => FileDialogError::NoMatch,
            _ => return,
        };
        if let Some(s) = self.session.as_mut() {
            s.notice = Some(notice);
        }
    }

    fn refresh(&mut self) {
        let lister = self.lister();
        if let Some(s) = self.session.as_mut() {
            s.refresh(self.fs.as_ref(), lister, &self.root);
        }
    }

    fn enter(&mut self, dir: PathBuf) -> Result<DialogOutcome, FileDialogError> {
        let lister = self.lister();
        let s = self.session.as_mut().ok_or(FileDialogError::NotActive)?;
        s.notice = None;
        s.enter(dir, self.fs.as_ref(), lister, &self.root);
        Ok(DialogOutcome::Navigated(s.current_path.clone()))
    }

    fn complete(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let s = self.live_mut()?;
        let completion = CompletionEngine.complete(&s.typed_text, &s.entries);
        trace_completion_applied(&completion, &s.typed_text);
        match completion.text() {
            Some(text) => {
                s.typed_text = text.to_string();
                s.navigation_candidate = completion.directory_candidate().map(Path::to_path_buf);
                s.notice = None;
            }
            None => {
                s.navigation_candidate = None;
                s.notice = Some(FileDialogError::NoMatch);
            }
        }
        Ok(DialogOutcome::Completed(completion))
    }

    fn navigate_candidate(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let dir = self
            .live_mut()?
            .navigation_candidate
            .take()
            .ok_or_else(|| FileDialogError::invalid("no directory to enter"))?;
        self.enter(dir)
    }

    fn select_entry(&mut self, index: usize) -> Result<DialogOutcome, FileDialogError> {
        let s = self.live_mut()?;
        let entry = s
            .entries
            .get(index)
            .cloned()
            .ok_or_else(|| FileDialogError::invalid(format!("no entry at index {index}")))?;
        if entry.is_dir() {
            return self.enter(entry.path().to_path_buf());
        }
        s.typed_text = entry.name().to_string();
        s.navigation_candidate = None;
        s.notice = None;
        Ok(DialogOutcome::Selected(entry))
    }

    fn navigate_up(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let current = &self.live()?.current_path;
        if current == &self.root || !current.starts_with(&self.root) {
            return Err(FileDialogError::invalid("already at the root directory"));
        }
        let parent = current
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        self.enter(parent)
    }

    fn navigate_to(&mut self, path: PathBuf) -> Result<DialogOutcome, FileDialogError> {
        let current = &self.live()?.current_path;
        let joined = if path.is_absolute() {
            path
        } else {
            current.join(path)
        };
        let joined = lexically_normalize(&joined);
        let target = self.fs.canonicalize(&joined).unwrap_or(joined);
        if !target.starts_with(&self.root) {
            return Err(FileDialogError::invalid(format!(
                "{} is outside {}",
                target.display(),
                self.root.display()
            )));
        }
        if !self.fs.is_dir(&target) {
            return Err(FileDialogError::invalid(format!(
                "{} is not a directory",
                target.display()
            )));
        }
        self.enter(target)
    }

    fn set_active_extension(&mut self, ext: &str) -> Result<DialogOutcome, FileDialogError> {
        let s = self.live_mut()?;
        let stored = s
            .filters
            .get(ext)
            .filter(|e| !(e.contains('*') || e.contains('?')))
            .map(str::to_string)
            .ok_or_else(|| {
                FileDialogError::invalid(format!("{ext} is not one of the accepted extensions"))
            })?;
        s.active_extension = Some(stored);
        s.notice = None;
        Ok(DialogOutcome::Updated)
    }

    fn confirm(&mut self) -> Result<DialogOutcome, FileDialogError> {
        match self.mode() {
            DialogMode::Closed => Err(FileDialogError::NotActive),
            DialogMode::OpenDirectory => self.confirm_directory(),
            DialogMode::OpenFile => self.confirm_open_file(),
            DialogMode::SaveFile => self.confirm_save_file(),
        }
    }

    fn confirm_directory(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let current = self.live()?.current_path.clone();
        if !self.fs.is_dir(&current) {
            return self.recover_vanished();
        }
        self.finish(current)
    }

    fn confirm_open_file(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let s = self.live()?;
        let name = validated_name(&s.typed_text)?;
        let target = s.current_path.join(&name);
        let metadata = match self.fs.metadata(&target) {
            Ok(md) => md,
            Err(_) => {
                if !self.fs.is_dir(&self.live()?.current_path) {
                    return self.recover_vanished();
                }
                return Err(FileDialogError::invalid(format!("{name} does not exist")));
            }
        };
        if metadata.is_dir {
            return self.enter(target);
        }
        if !self.live()?.filters.matches(&name) {
            return Err(FileDialogError::invalid(format!(
                "{name} does not have an accepted extension"
            )));
        }
        self.finish(target)
    }

    fn confirm_save_file(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let policy = self.extension_policy;
        let s = self.live()?;
        let name = validated_name(&s.typed_text)?;
        let current = s.current_path.clone();

        let typed_target = current.join(&name);
        if self.fs.is_dir(&typed_target) {
            return self.enter(typed_target);
        }
        if !self.fs.is_dir(&current) {
            return self.recover_vanished();
        }

        let s = self.live()?;
        let file_name = apply_extension(&name, s.active_extension.as_deref(), policy);
        let target = current.join(file_name);
        if self.fs.is_dir(&target) {
            return Err(FileDialogError::invalid(format!(
                "{} is a directory",
                target.display()
            )));
        }

        match OverwriteGuard.check(self.fs.as_ref(), &target) {
            OverwriteDecision::NeedsConfirmation => {
                trace_overwrite_gated(&target);
                let s = self.live_mut()?;
                s.pending_overwrite = Some(target.clone());
                s.notice = None;
                Ok(DialogOutcome::OverwritePending(target))
            }
            OverwriteDecision::Clear => self.finish(target),
        }
    }

    fn confirm_overwrite(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let s = self.live_mut()?;
        let target = s
            .pending_overwrite
            .take()
            .ok_or_else(|| FileDialogError::invalid("no overwrite is pending"))?;
        let parent_ok = target.parent().is_some_and(|p| self.fs.is_dir(p));
        if !parent_ok {
            return self.recover_vanished();
        }
        self.finish(target)
    }

    fn reject_overwrite(&mut self) -> Result<DialogOutcome, FileDialogError> {
        let s = self.live_mut()?;
        if s.pending_overwrite.take().is_none() {
            return Err(FileDialogError::invalid("no overwrite is pending"));
        }
        s.notice = None;
        Ok(DialogOutcome::OverwriteRejected)
    }

    /// The current directory disappeared: re-list, which falls back to the
    /// root, and report the navigation instead of completing.
    fn recover_vanished(&mut self) -> Result<DialogOutcome, FileDialogError> {
        self.refresh();
        let s = self.live_mut()?;
        Ok(DialogOutcome::Navigated(s.current_path.clone()))
    }
}

/// A typed name must be a single path component in the current directory.
fn validated_name(typed: &str) -> Result<String, FileDialogError> {
    let name = typed.trim();
    if name.is_empty() {
        return Err(FileDialogError::invalid("no file name given"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.ends_with(['/', '\\']) => {
            Ok(name.to_string())
        }
        _ => Err(FileDialogError::invalid(format!(
            "{name} is not a plain file name"
        ))),
    }
}

fn apply_extension(name: &str, ext: Option<&str>, policy: ExtensionPolicy) -> String {
    let Some(ext) = ext else {
        return name.to_string();
    };
    if name.to_lowercase().ends_with(ext) {
        return name.to_string();
    }
    match policy {
        ExtensionPolicy::KeepUser => name.to_string(),
        ExtensionPolicy::AddIfMissing => format!("{}{ext}", name.trim_end_matches('.')),
        ExtensionPolicy::ReplaceByFilter => {
            let stem = Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name);
            format!("{stem}{ext}")
        }
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexically_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(feature = "tracing")]
fn trace_session_opened(mode: DialogMode, title: &str, root: &Path) {
    debug!(
        event = "session.opened",
        mode = mode.as_str(),
        title,
        root = %root.display(),
        "dialog session opened"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_session_opened(_mode: DialogMode, _title: &str, _root: &Path) {}

#[cfg(feature = "tracing")]
fn trace_session_rejected(mode: DialogMode) {
    debug!(
        event = "session.rejected",
        mode = mode.as_str(),
        "dialog request rejected: session busy"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_session_rejected(_mode: DialogMode) {}

#[cfg(feature = "tracing")]
fn trace_session_closed(mode: DialogMode, reason: CloseReason) {
    debug!(
        event = "session.closed",
        mode = mode.as_str(),
        reason = reason.as_str(),
        "dialog session closed"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_session_closed(_mode: DialogMode, _reason: CloseReason) {}

#[cfg(feature = "tracing")]
fn trace_completion_applied(completion: &Completion, typed: &str) {
    trace!(
        event = "completion.applied",
        outcome = completion.kind(),
        typed,
        text = completion.text().unwrap_or(typed),
        "completion applied"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_completion_applied(_completion: &Completion, _typed: &str) {}

#[cfg(feature = "tracing")]
fn trace_overwrite_gated(path: &Path) {
    debug!(
        event = "overwrite.gated",
        path = %path.display(),
        "save target exists; confirmation required"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_overwrite_gated(_path: &Path) {}
