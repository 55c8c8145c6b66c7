//! User-facing notifications.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Success,
    Info,
    Warning,
    Error,
}

/// A toast-style message. Errors stay until dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: NotificationVariant,
    pub sticky: bool,
}

impl Notification {
    pub fn new(variant: NotificationVariant, message: impl Into<String>) -> Self {
        let title = match variant {
            NotificationVariant::Success => "Success",
            NotificationVariant::Info => "Info",
            NotificationVariant::Warning => "Warning",
            NotificationVariant::Error => "Error",
        };
        Self {
            title: title.to_string(),
            message: message.into(),
            variant,
            sticky: variant == NotificationVariant::Error,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Error, message)
    }
}

/// Fire-and-forget delivery of notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Error => {
                tracing::error!(title = %notification.title, "{}", notification.message)
            }
            NotificationVariant::Warning => {
                tracing::warn!(title = %notification.title, "{}", notification.message)
            }
            NotificationVariant::Success | NotificationVariant::Info => {
                tracing::info!(title = %notification.title, "{}", notification.message)
            }
        }
    }
}
