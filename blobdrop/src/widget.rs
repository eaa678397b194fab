//! The upload session: pick a file, push it to blob storage, open the result.
//!
//! ```text
//! select_files() ──► upload() ──► open_uploaded()
//!                      │
//!                      ├─ no file picked      → Warning, Err(NoFileSelected), no request
//!                      ├─ already uploading   → Warning, Err(UploadInProgress), no request
//!                      └─ busy = true
//!                           PUT {service}/{container}/{encoded name}?{sas}
//!                           ├─ 2xx           → uploaded_url = url, Success
//!                           ├─ other status  → Error(body), uploaded_url unchanged
//!                           └─ no response   → Error(message), uploaded_url unchanged
//!                         busy = false
//! ```
//!
//! All operations take `&self` so a front end can share one widget between tasks and watch the
//! busy flag while an upload is suspended on the network.

use bon::bon;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};

use crate::client::{BlobClient, ReqwestBlobClient};
use crate::config::Config;
use crate::errors::{Error, Result, error_chain};
use crate::notifications::{Notification, Notifier};
use crate::opener::{Launcher, SystemLauncher};
use crate::picker::{Picker, SelectedFile};
use crate::target::UploadTarget;

#[derive(Debug, Default)]
struct Session {
    picker: Picker,
    uploaded_url: Option<String>,
}

/// Clears the busy flag when dropped, including when the upload future is dropped mid-flight.
struct BusyGuard<'a> {
    busy: &'a watch::Sender<bool>,
}

impl<'a> BusyGuard<'a> {
    /// Set the flag, or return `None` if it was already set.
    fn acquire(busy: &'a watch::Sender<bool>) -> Option<Self> {
        let acquired = busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        acquired.then(|| Self { busy })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

pub struct UploadWidget {
    target: UploadTarget,
    client: Arc<dyn BlobClient>,
    launcher: Arc<dyn Launcher>,
    notifier: Notifier,
    session: Mutex<Session>,
    busy: watch::Sender<bool>,
}

#[bon]
impl UploadWidget {
    /// # Example
    ///
    /// ```ignore
    /// let widget = UploadWidget::builder()
    ///     .target(UploadTarget::new("acct", "cont", sas_token))
    ///     .client(Arc::new(ReqwestBlobClient::new(None)?))
    ///     .build();
    /// ```
    #[builder]
    pub fn new(
        target: UploadTarget,
        client: Arc<dyn BlobClient>,
        #[builder(default = Arc::new(SystemLauncher) as Arc<dyn Launcher>)] launcher: Arc<dyn Launcher>,
        #[builder(default)] notifier: Notifier,
    ) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            target,
            client,
            launcher,
            notifier,
            session: Mutex::new(Session::default()),
            busy,
        }
    }
}

impl UploadWidget {
    /// Widget wired to the real blob service and the system browser.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ReqwestBlobClient::new(config.upload.timeout)?;
        Ok(Self::builder()
            .target(UploadTarget::from(&config.storage))
            .client(Arc::new(client))
            .notifier(Notifier::new(config.notifications.channel_capacity))
            .build())
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // The session holds plain data, so a poisoned lock is still consistent.
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn target(&self) -> &UploadTarget {
        &self.target
    }

    /// Subscribe to notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Receiver for driving a spinner; changes whenever an upload starts or ends.
    pub fn busy_updates(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.session().picker.selected().cloned()
    }

    /// URL of the last successful upload.
    pub fn uploaded_url(&self) -> Option<String> {
        self.session().uploaded_url.clone()
    }

    /// Handle a file-selection event. Only the first file is kept; an empty selection is ignored.
    pub fn select_files<I>(&self, files: I) -> bool
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        self.session().picker.select(files)
    }

    /// Upload the selected file as a block blob and return its URL.
    ///
    /// Every outcome is also published as a [`Notification`].
    pub async fn upload(&self) -> Result<String> {
        let Some(file) = self.selected_file() else {
            self.notifier.notify(Notification::NoFileSelected);
            return Err(Error::NoFileSelected);
        };

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            self.notifier.notify(Notification::UploadInProgress);
            return Err(Error::UploadInProgress);
        };

        let url = self.target.blob_url(&file.name);

        tracing::info!(
            file = %file.name,
            content_type = %file.content_type,
            size = file.size(),
            account = %self.target.account_name(),
            container = %self.target.container_name(),
            "Uploading file"
        );

        match self.client.put_block_blob(&url, &file.content_type, file.data.clone()).await {
            Ok(response) if response.is_success() => {
                self.session().uploaded_url = Some(url.clone());
                self.notifier.notify(Notification::UploadSucceeded { url: url.clone() });
                Ok(url)
            }
            Ok(response) => {
                self.notifier.notify(Notification::UploadFailed {
                    status: response.status,
                    body: response.body.clone(),
                });
                Err(Error::UploadRejected {
                    status: response.status,
                    body: response.body,
                })
            }
            Err(e) => {
                let message = match &e {
                    Error::Transport(source) => error_chain(source),
                    other => error_chain(other),
                };
                self.notifier.notify(Notification::UploadError { message });
                Err(e)
            }
        }
    }

    /// Open the last uploaded blob with the configured launcher and return its URL.
    pub fn open_uploaded(&self) -> Result<String> {
        let Some(url) = self.uploaded_url() else {
            self.notifier.notify(Notification::NothingUploaded);
            return Err(Error::NothingUploaded);
        };

        self.launcher.launch(&url)?;
        tracing::info!(container = %self.target.container_name(), "Opened uploaded file");
        Ok(url)
    }
}

impl std::fmt::Debug for UploadWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadWidget")
            .field("target", &self.target)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}
