use std::path::Path;

use crate::core::{DialogMode, ExtensionFilters, FileDialogError};
use crate::dialog::DialogEvent;
use crate::lister::PathEntry;
use crate::session::DialogSession;

/// Read-only snapshot handed to the renderer once per frame.
///
/// Everything a modal surface needs to draw the dialog: title bar, text
/// input, selectable entry list, the overwrite prompt and an optional hint.
#[derive(Clone, Copy, Debug)]
pub struct DialogView<'a> {
    /// Active mode.
    pub mode: DialogMode,
    /// Request title.
    pub title: &'a str,
    /// Anchor directory.
    pub root: &'a Path,
    /// Directory being browsed.
    pub current_path: &'a Path,
    /// Listing of `current_path`.
    pub entries: &'a [PathEntry],
    /// Text input contents.
    pub typed_text: &'a str,
    /// Accepted extensions.
    pub extensions: &'a ExtensionFilters,
    /// Extension appended to save names.
    pub active_extension: Option<&'a str>,
    /// Target waiting for overwrite confirmation; draw the prompt when set.
    pub pending_overwrite: Option<&'a Path>,
    /// Directory offered by the last unambiguous completion.
    pub navigation_candidate: Option<&'a Path>,
    /// Last non-fatal condition worth a visual cue.
    pub notice: Option<&'a FileDialogError>,
}

impl<'a> DialogView<'a> {
    pub(crate) fn new(session: &'a DialogSession, root: &'a Path) -> Self {
        Self {
            mode: session.mode(),
            title: session.title(),
            root,
            current_path: session.current_path(),
            entries: session.entries(),
            typed_text: session.typed_text(),
            extensions: session.filters(),
            active_extension: session.active_extension(),
            pending_overwrite: session.pending_target(),
            navigation_candidate: session.navigation_candidate(),
            notice: session.notice(),
        }
    }

    /// Whether the overwrite prompt should be shown.
    pub fn is_overwrite_prompt(&self) -> bool {
        self.pending_overwrite.is_some()
    }

    /// Whether the "up" control should be enabled.
    pub fn can_navigate_up(&self) -> bool {
        self.current_path != self.root
    }
}

/// The rendering collaborator.
///
/// Implemented by the host's GUI layer. Each frame it receives the current
/// view, draws it, and returns the gestures the user made during that frame
/// (text edits, entry selection, up, confirm, cancel, overwrite answers,
/// window close) in the order they happened.
pub trait DialogFrontend {
    /// Draw the dialog and collect this frame's gestures.
    fn draw(&mut self, view: &DialogView<'_>) -> Vec<DialogEvent>;
}

