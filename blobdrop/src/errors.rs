use reqwest::StatusCode;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload was triggered before any file was picked
    #[error("No file selected")]
    NoFileSelected,

    /// Upload was triggered while another one is still in flight
    #[error("An upload is already in progress")]
    UploadInProgress,

    /// The storage service answered with a non-success status
    #[error("Upload rejected with status {status}: {body}")]
    UploadRejected { status: StatusCode, body: String },

    /// Network, DNS or timeout failure before a response arrived
    #[error("Upload transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Open was requested before any upload succeeded
    #[error("No file uploaded yet")]
    NothingUploaded,

    /// The picked path has no usable file name component
    #[error("Invalid file name: {path}")]
    InvalidFileName { path: String },

    /// Reading the picked file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The platform URL handler could not be started
    #[error("Failed to open {url}: {message}")]
    Launch { url: String, message: String },

    /// Configuration is missing a required value or is inconsistent
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl Error {
    /// Text shown to the user, in the wording of the upload panel's alerts.
    pub fn user_message(&self) -> String {
        match self {
            Error::NoFileSelected => "Please select a file to upload.".to_string(),
            Error::UploadInProgress => "An upload is already in progress.".to_string(),
            Error::UploadRejected { body, .. } => format!("Upload failed: {body}"),
            Error::Transport(e) => format!("Upload error: {e}"),
            Error::NothingUploaded => "No file uploaded yet.".to_string(),
            Error::InvalidFileName { path } => format!("Cannot upload {path}: it has no file name"),
            Error::Io(e) => format!("Could not read file: {e}"),
            Error::Launch { url, message } => format!("Could not open {url}: {message}"),
            Error::Config { message } => message.clone(),
        }
    }
}

/// Render an error followed by each of its causes, `outer: cause: root cause`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // Some wrappers repeat their cause's text in their own message
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Type alias for widget operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_upload_message_carries_server_text() {
        let err = Error::UploadRejected {
            status: StatusCode::FORBIDDEN,
            body: "AuthenticationFailed".to_string(),
        };
        assert_eq!(err.user_message(), "Upload failed: AuthenticationFailed");
        assert!(err.to_string().contains("403"));
    }

    #[derive(ThisError, Debug)]
    #[error("error sending request")]
    struct Wrapper(#[source] std::io::Error);

    #[test]
    fn error_chain_includes_every_cause() {
        let err = Wrapper(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused"));
        assert_eq!(error_chain(&err), "error sending request: Connection refused");
        assert_eq!(error_chain(&Error::NoFileSelected), "No file selected");
    }

    #[test]
    fn user_input_errors_use_alert_wording() {
        assert_eq!(Error::NoFileSelected.user_message(), "Please select a file to upload.");
        assert_eq!(Error::NothingUploaded.user_message(), "No file uploaded yet.");
    }
}
