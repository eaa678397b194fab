//! User-facing notifications.
//!
//! Every outcome the upload panel reports (warnings, success, failures) is published as a
//! [`Notification`] on a broadcast channel instead of a blocking dialog. Front ends subscribe and
//! render them however they like; publishing never waits for a reader, and a notification sent
//! with no subscriber is only logged.

use reqwest::StatusCode;
use tokio::sync::broadcast;

/// How a front end should present a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Upload was triggered with nothing picked
    NoFileSelected,
    /// Upload was triggered while another one was still running
    UploadInProgress,
    /// The PUT returned a success status
    UploadSucceeded { url: String },
    /// The PUT returned an error status; `body` is the service's response text
    UploadFailed { status: StatusCode, body: String },
    /// The PUT never got a response
    UploadError { message: String },
    /// Open was triggered before anything was uploaded
    NothingUploaded,
}

impl Notification {
    pub fn severity(&self) -> Severity {
        match self {
            Notification::UploadSucceeded { .. } => Severity::Success,
            Notification::NoFileSelected | Notification::UploadInProgress | Notification::NothingUploaded => Severity::Warning,
            Notification::UploadFailed { .. } | Notification::UploadError { .. } => Severity::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notification::NoFileSelected => "Please select a file to upload.".to_string(),
            Notification::UploadInProgress => "An upload is already in progress.".to_string(),
            Notification::UploadSucceeded { .. } => "File uploaded successfully!".to_string(),
            Notification::UploadFailed { body, .. } => format!("Upload failed: {body}"),
            Notification::UploadError { message } => format!("Upload error: {message}"),
            Notification::NothingUploaded => "No file uploaded yet.".to_string(),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Publishing half of the notification channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn notify(&self, notification: Notification) {
        match notification.severity() {
            Severity::Success => tracing::info!(notification = ?notification, "{}", notification),
            Severity::Warning => tracing::warn!(notification = ?notification, "{}", notification),
            Severity::Error => tracing::error!(notification = ?notification, "{}", notification),
        }

        if self.tx.send(notification).is_err() {
            tracing::debug!("No notification subscribers");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(16)
    }
}
