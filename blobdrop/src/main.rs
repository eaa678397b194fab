use std::process::ExitCode;

use anyhow::Context;
use blobdrop::{Config, Notification, SelectedFile, Severity, UploadWidget, telemetry};
use clap::Parser;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Print every notification published so far.
fn drain_notifications(rx: &mut broadcast::Receiver<Notification>) {
    loop {
        match rx.try_recv() {
            Ok(notification) => match notification.severity() {
                Severity::Success => println!("✅ {notification}"),
                Severity::Warning => eprintln!("⚠️ {notification}"),
                Severity::Error => eprintln!("❌ {notification}"),
            },
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notification output fell behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

async fn run(args: &blobdrop::config::Args, config: &Config) -> anyhow::Result<bool> {
    let widget = UploadWidget::from_config(config)?;
    let mut notifications = widget.subscribe();

    if let Some(path) = &args.file {
        let file = SelectedFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        widget.select_files([file]);
    }

    let uploaded = widget.upload().await;
    drain_notifications(&mut notifications);

    let url = match uploaded {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "Upload did not complete");
            return Ok(false);
        }
    };
    println!("{url}");

    if args.open {
        let opened = widget.open_uploaded();
        drain_notifications(&mut notifications);
        opened?;
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Install rustls crypto provider before anything else that might build a TLS client
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let args = blobdrop::config::Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(ExitCode::SUCCESS);
    }

    telemetry::init_telemetry(config.enable_otel_export)?;
    tracing::debug!(?args, ?config, "Starting upload");

    let result = run(&args, &config).await;
    telemetry::shutdown_telemetry();

    Ok(if result? { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
