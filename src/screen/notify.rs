//! User-facing notifications
//!
//! The toast stack the screen writes into. A notification pushed with a key
//! replaces the earlier one with the same key, so "Saving..." turns into the
//! outcome of that save instead of stacking up.

use std::fmt;

/// Key shared by the single-row save notifications
pub const SAVE_TOAST: &str = "savetoast";

/// Key shared by the bulk import notifications
pub const IMPORT_TOAST: &str = "importtoast";

/// How a notification is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Spinner while a request is outstanding
    Loading,
    Success,
    /// Soft failure: the call worked but changed nothing
    Warning,
    /// Transport or backend failure
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Loading => "…",
            Severity::Success => "ok",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// One toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: Option<&'static str>,
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            key: None,
            severity,
            message: message.into(),
        }
    }

    /// Attach a replacement key
    pub fn keyed(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self::new(Severity::Loading, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Visible notifications, oldest first
#[derive(Debug, Default, Clone)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notification, replacing any with the same key
    pub fn push(&mut self, notification: Notification) {
        if let Some(key) = notification.key {
            if let Some(existing) = self.items.iter_mut().find(|n| n.key == Some(key)) {
                *existing = notification;
                return;
            }
        }
        self.items.push(notification);
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    /// The notification currently shown under `key`
    pub fn get(&self, key: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.key == Some(key))
    }

    /// Dismiss the notification at `index`
    pub fn dismiss(&mut self, index: usize) -> Option<Notification> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Drop the spinner shown under `key`, leaving finished notifications
    pub fn dismiss_pending(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|n| !(n.key == Some(key) && n.severity == Severity::Loading));
        self.items.len() != before
    }

    /// Remove and return every notification
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
