//! Integration points with the hosting UI shell.
//!
//! The session layer never renders anything itself; it emits toasts and
//! redirect requests through these traits. The console wires them to its
//! notification system and router, tests wire them to recorders.

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Receives user-facing notifications (toasts in the console).
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Navigation targets the session layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    /// The application root, entered after a successful login.
    Root,
    /// The login boundary, entered after any logout.
    Login,
}

/// Receives navigation requests (router redirects in the console).
///
/// Navigation is fire-and-forget; the session layer never waits on it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavTarget);
}
