#![deny(missing_docs)]
//! Modal file-system dialogs for GRender applications.
//!
//! One [`FileDialog`] is owned by the application and passed by reference to
//! wherever a directory, an existing file, or a save target is needed. The
//! dialog keeps the state of the single live session (current directory,
//! filtered listing, typed text, overwrite prompt) and runs the result
//! callback at most once, with a path it has validated itself.
//!
//! Drawing is left to the host: implement [`DialogFrontend`] on top of the
//! GUI layer, or read [`FileDialog::view`] and feed gestures back through
//! [`FileDialog::handle_event`].
//!
//! Pieces, leaves first:
//! - [`PathLister`] lists one directory (directories first, case-insensitive
//!   names, extension-filtered files).
//! - [`CompletionEngine`] completes typed text against a listing.
//! - [`OverwriteGuard`] decides whether a save needs confirmation.
//! - [`FileDialog`] drives modes and transitions.

mod callback;
mod completion;
mod core;
mod dialog;
mod frontend;
mod fs;
mod lister;
mod overwrite;
mod session;

pub use completion::{Completion, CompletionEngine};
pub use core::{DialogConfig, DialogMode, ExtensionFilters, ExtensionPolicy, FileDialogError};
pub use dialog::{DialogEvent, DialogOutcome, FileDialog};
pub use frontend::{DialogFrontend, DialogView};
pub use fs::{FileSystem, FsEntry, FsMetadata, StdFileSystem};
pub use lister::{PathEntry, PathLister};
pub use overwrite::{OverwriteDecision, OverwriteGuard};
pub use session::DialogSession;
