//! Shared helpers for unit tests.

use std::sync::{Arc, Mutex};
use url::Url;
use wiremock::MockServer;

use crate::client::ReqwestBlobClient;
use crate::errors::Result;
use crate::opener::Launcher;
use crate::target::UploadTarget;
use crate::widget::UploadWidget;

/// reqwest is built without a bundled crypto provider; the binary installs one in `main`.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Launcher that records URLs instead of opening them.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, url: &str) -> Result<()> {
        self.launched.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Target for account `acct`, container `cont`, optionally served by a mock server.
pub fn mock_target(server: Option<&MockServer>) -> UploadTarget {
    let target = UploadTarget::new("acct", "cont", "sv=2022-11-02&sig=abc");
    match server {
        Some(server) => target.with_endpoint(Url::parse(&server.uri()).expect("mock server uri")),
        None => target,
    }
}

/// Widget uploading to `server` with a recording launcher.
pub fn widget_for(server: &MockServer) -> (UploadWidget, Arc<RecordingLauncher>) {
    install_crypto_provider();
    let launcher = Arc::new(RecordingLauncher::default());
    let widget = UploadWidget::builder()
        .target(mock_target(Some(server)))
        .client(Arc::new(ReqwestBlobClient::new(None).expect("http client")))
        .launcher(launcher.clone())
        .build();
    (widget, launcher)
}
