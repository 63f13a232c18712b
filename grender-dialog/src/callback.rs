use std::path::Path;

type PathCallbackFn = dyn FnOnce(&Path) + 'static;

/// Single-invocation handle for a dialog's result callback.
///
/// The dialog owns the handle from the request until exactly one of
/// {invoke, cancel} happens. Invoking consumes it, so a second call cannot
/// be expressed; cancelling drops it without running the closure.
pub(crate) struct PathCallback {
    inner: Box<PathCallbackFn>,
}

impl std::fmt::Debug for PathCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathCallback").finish_non_exhaustive()
    }
}

impl PathCallback {
    pub(crate) fn new<F>(callback: F) -> Self
    where
        F: FnOnce(&Path) + 'static,
    {
        Self {
            inner: Box::new(callback),
        }
    }

    pub(crate) fn invoke(self, path: &Path) {
        (self.inner)(path)
    }
}
