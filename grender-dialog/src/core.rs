use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use thiserror::Error;

/// Dialog mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DialogMode {
    /// No session is live.
    #[default]
    Closed,
    /// Pick a directory
    OpenDirectory,
    /// Pick an existing file
    OpenFile,
    /// Choose a file name to save to
    SaveFile,
}

impl DialogMode {
    /// Whether a session is live in this mode.
    pub fn is_open(self) -> bool {
        !matches!(self, DialogMode::Closed)
    }

    /// Whether listings in this mode contain directories only.
    pub fn directories_only(self) -> bool {
        matches!(self, DialogMode::OpenDirectory)
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            DialogMode::Closed => "closed",
            DialogMode::OpenDirectory => "open_directory",
            DialogMode::OpenFile => "open_file",
            DialogMode::SaveFile => "save_file",
        }
    }
}

/// Ordered set of accepted file extensions (e.g. `.png`, `.tar.gz`, `*.tx?`).
///
/// Tokens are normalized to lower case with a leading dot, so `"PNG"`,
/// `"png"` and `".png"` are the same filter. Insertion order is kept; the
/// first token is the default save extension. An empty set accepts every
/// file, as do the wildcard tokens `*`, `.*` and `*.*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionFilters {
    exts: IndexSet<String>,
}

impl ExtensionFilters {
    /// Build a filter set from extension tokens. Blank tokens are skipped.
    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exts = exts
            .into_iter()
            .filter_map(|s| normalize_extension(s.as_ref()))
            .collect();
        Self { exts }
    }

    /// Returns `true` when no extension was given (accept all).
    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    /// Number of distinct extension tokens.
    pub fn len(&self) -> usize {
        self.exts.len()
    }

    /// Iterate the normalized tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }

    /// The first token that can be appended to a file name, if any.
    ///
    /// Wildcards and globs are skipped since they do not name one extension.
    pub fn default_extension(&self) -> Option<&str> {
        self.iter().find(|e| is_plain_extension(e))
    }

    /// Whether `ext` (in any spelling) is a member of the set.
    pub fn contains(&self, ext: &str) -> bool {
        normalize_extension(ext).is_some_and(|e| self.exts.contains(&e))
    }

    /// The stored spelling of `ext`, if it is a member of the set.
    pub fn get(&self, ext: &str) -> Option<&str> {
        let ext = normalize_extension(ext)?;
        self.exts.get(&ext).map(String::as_str)
    }

    /// Whether a file name passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        if self.exts.is_empty() {
            return true;
        }
        let name_lower = name.to_lowercase();
        let ext_full = full_extension_lower(&name_lower);
        self.exts.iter().any(|ext| {
            if is_wildcard(ext) {
                true
            } else if ext.contains('*') || ext.contains('?') {
                wildcard_match(ext, ext_full)
            } else {
                has_extension_suffix(&name_lower, ext)
            }
        })
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionFilters {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// How the active extension is applied to a typed save name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtensionPolicy {
    /// Append the active extension when the name does not already end with it.
    #[default]
    AddIfMissing,
    /// Replace whatever extension the name carries with the active one.
    ReplaceByFilter,
    /// Use the typed name verbatim.
    KeepUser,
}

/// Construction-time configuration for [`FileDialog`](crate::FileDialog).
///
/// ```
/// use grender_dialog::{DialogConfig, ExtensionPolicy};
/// let cfg = DialogConfig::new("/srv/assets")
///     .show_hidden(false)
///     .extension_policy(ExtensionPolicy::ReplaceByFilter);
/// assert_eq!(cfg.root, std::path::PathBuf::from("/srv/assets"));
/// ```
#[derive(Clone, Debug)]
pub struct DialogConfig {
    /// Directory every session is anchored to. Navigation never leaves it.
    pub root: PathBuf,
    /// List dot-prefixed entries.
    pub show_hidden: bool,
    /// Save-name extension handling.
    pub extension_policy: ExtensionPolicy,
}

impl Default for DialogConfig {
    fn default() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root)
    }
}

impl DialogConfig {
    /// Create a configuration anchored at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            show_hidden: true,
            extension_policy: ExtensionPolicy::default(),
        }
    }

    /// Show or hide dot-prefixed entries.
    pub fn show_hidden(mut self, yes: bool) -> Self {
        self.show_hidden = yes;
        self
    }

    /// Choose how save names receive the active extension.
    pub fn extension_policy(mut self, policy: ExtensionPolicy) -> Self {
        self.extension_policy = policy;
        self
    }
}

/// Errors surfaced by the dialog subsystem.
///
/// None of these destroy a live session: an `Err` from an interaction means
/// the action was rejected and the session is unchanged.
#[derive(Error, Debug)]
pub enum FileDialogError {
    /// A directory could not be read (permissions, deleted underneath us).
    #[error("cannot read {}: {source}", path.display())]
    Filesystem {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The target does not satisfy the current mode, or the action is not
    /// accepted in the current state.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// Another dialog session is already live.
    #[error("a dialog session is already active")]
    SessionBusy,
    /// Completion found no entry starting with the typed text.
    #[error("no entry matches the typed text")]
    NoMatch,
    /// An interaction arrived while no session is live.
    #[error("no dialog session is active")]
    NotActive,
}

impl FileDialogError {
    pub(crate) fn filesystem(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }
}

fn normalize_extension(token: &str) -> Option<String> {
    let t = token.trim().to_lowercase();
    if t.is_empty() || t == "." {
        return None;
    }
    if is_wildcard(&t) {
        return Some(".*".to_string());
    }
    let t = t.strip_prefix('*').unwrap_or(&t);
    if t.starts_with('.') {
        Some(t.to_string())
    } else {
        Some(format!(".{t}"))
    }
}

fn is_wildcard(token: &str) -> bool {
    matches!(token, "*" | ".*" | "*.*")
}

fn is_plain_extension(token: &str) -> bool {
    !(token.contains('*') || token.contains('?'))
}

fn full_extension_lower(name_lower: &str) -> &str {
    name_lower.find('.').map(|i| &name_lower[i..]).unwrap_or("")
}

fn has_extension_suffix(name_lower: &str, ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() || !name_lower.ends_with(ext) {
        return false;
    }
    let prefix_len = name_lower.len() - ext.len();
    if prefix_len == 0 {
        return false;
    }
    name_lower.as_bytes()[prefix_len - 1] == b'.'
}

/// Glob match over bytes: `*` matches any run, `?` any single byte.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star_pi: Option<usize> = None;
    let mut star_ti = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star_pi = Some(pi);
            pi += 1;
            star_ti = ti;
        } else if let Some(sp) = star_pi {
            pi = sp + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
