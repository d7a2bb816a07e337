/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A message for the notification sink. Notices are never stored in the
/// state snapshot; they are fire-and-forget towards whatever front end is
/// listening.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Playback position in seconds, forwarded straight to the time display.
/// Deliberately not part of the state snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub current: f64,
    pub total: f64,
}
