//! # blobdrop: direct-to-blob file uploads
//!
//! `blobdrop` uploads a local file straight into an Azure Blob Storage container using a
//! pre-generated shared access signature (SAS), then lets the caller re-open the uploaded blob in
//! a browser. There is no server in between: the SAS token is the only credential, and the upload
//! is one `PUT` of the whole file as a block blob.
//!
//! ## Components
//!
//! - **Picker** ([`picker`]): holds the file chosen by the user. A selection event may carry
//!   several files; the first one wins and an empty selection is ignored.
//! - **Uploader** ([`widget::UploadWidget::upload`]): builds
//!   `https://{account}.blob.core.windows.net/{container}/{encoded name}?{sas}` from the injected
//!   [`target::UploadTarget`], sends the bytes through a [`client::BlobClient`] with
//!   `x-ms-blob-type: BlockBlob`, and keeps a busy flag raised for exactly the duration of the call.
//! - **Opener** ([`widget::UploadWidget::open_uploaded`]): hands the last uploaded URL to a
//!   [`opener::Launcher`].
//!
//! Outcomes are published as [`notifications::Notification`]s on a broadcast channel rather than
//! shown as modal dialogs, so any front end (the bundled CLI, a GUI, a test) can render them.
//!
//! A second upload started while one is running is rejected with
//! [`errors::Error::UploadInProgress`]; nothing is queued.
//!
//! ## Quick Start
//!
//! ```no_run
//! use blobdrop::{Config, SelectedFile, UploadWidget};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = blobdrop::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     let widget = UploadWidget::from_config(&config)?;
//!     widget.select_files([SelectedFile::from_path("report.pdf").await?]);
//!
//!     let url = widget.upload().await?;
//!     println!("uploaded to {url}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod notifications;
pub mod opener;
pub mod picker;
pub mod target;
pub mod telemetry;
pub mod widget;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use errors::{Error, Result};
pub use notifications::{Notification, Notifier, Severity};
pub use picker::SelectedFile;
pub use target::UploadTarget;
pub use widget::UploadWidget;
