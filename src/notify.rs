//! Transient user notifications ("toasts").
//!
//! Hooks raise one notification per completed mutation: a success message,
//! or a generic failure message that never echoes the underlying error
//! detail. The error itself is still returned to the caller.
//!
//! Notifications are emitted on **stderr** by the CLI so stdout remains
//! parseable for scripts.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
            at: Utc::now(),
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: title.into(),
            description: description.into(),
            at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NotificationKind::Failure
    }
}

/// Receives notifications raised by hooks.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Human-friendly notifications on stderr: "✓ Prompt created".
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, n: Notification) {
        let mark = match n.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Failure => "✗",
        };
        let line = if n.description.is_empty() {
            format!("{} {}\n", mark, n.title)
        } else {
            format!("{} {}: {}\n", mark, n.title, n.description)
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable notifications: one JSON object per line on stderr.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, n: Notification) {
        let obj = serde_json::json!({
            "event": "notification",
            "kind": match n.kind {
                NotificationKind::Success => "success",
                NotificationKind::Failure => "failure",
            },
            "title": n.title,
            "description": n.description,
            "at": n.at.to_rfc3339(),
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// Routes notifications into `tracing` only.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.kind {
            NotificationKind::Success => {
                tracing::info!(title = %n.title, description = %n.description, "notification")
            }
            NotificationKind::Failure => {
                tracing::warn!(title = %n.title, description = %n.description, "notification")
            }
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}

/// Notification mode for the CLI: human (stderr), JSON (stderr) or log only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotifyMode {
    Human,
    Json,
    Log,
}

impl NotifyMode {
    /// Default: human notifications when stderr is a TTY, otherwise log only.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            NotifyMode::Human
        } else {
            NotifyMode::Log
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "human" => Some(NotifyMode::Human),
            "json" => Some(NotifyMode::Json),
            "log" => Some(NotifyMode::Log),
            _ => None,
        }
    }

    pub fn notifier(&self) -> Box<dyn Notifier> {
        match self {
            NotifyMode::Human => Box::new(StderrNotifier),
            NotifyMode::Json => Box::new(JsonNotifier),
            NotifyMode::Log => Box::new(TracingNotifier),
        }
    }
}
