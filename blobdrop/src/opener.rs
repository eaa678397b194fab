//! Opening an uploaded blob in a browser.

use std::process::{Command, Stdio};

use crate::errors::{Error, Result};

/// Hands a URL to something that can display it.
pub trait Launcher: Send + Sync {
    fn launch(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default handler (`xdg-open`, `open`, `start`).
///
/// The handler is spawned and left running; its exit status is not awaited.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            // `start` treats the first quoted argument as a window title
            command.args(["/C", "start", "", url]);
            command
        } else if cfg!(target_os = "macos") {
            let mut command = Command::new("open");
            command.arg(url);
            command
        } else {
            let mut command = Command::new("xdg-open");
            command.arg(url);
            command
        }
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, url: &str) -> Result<()> {
        let mut command = Self::command(url);
        command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

        command.spawn().map_err(|e| Error::Launch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(program = ?command.get_program(), "Spawned URL handler");
        Ok(())
    }
}
