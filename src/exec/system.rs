use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::CollaboratorError;

use super::collaborators::{ActionOutcome, Automation, CollabResult};

/// macOS desktop automation via the standard command-line surface:
/// `open -a` for launches, `pkill` for closes, `osascript` for audio and
/// power. File operations go through tokio's fs layer directly.
pub struct DesktopAutomation;

impl DesktopAutomation {
    pub fn new() -> Self {
        Self
    }

    async fn run(program: &str, args: &[&str]) -> Result<(), CollaboratorError> {
        let status = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            Err(CollaboratorError::Backend(format!(
                "{} exited with {}",
                program, status
            )))
        }
    }
}

impl Default for DesktopAutomation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Automation for DesktopAutomation {
    async fn launch_app(&self, name: &str) -> CollabResult {
        info!(app = name, "launching application");
        Self::run("open", &["-a", name]).await?;
        Ok(ActionOutcome::ok(format!("Opening {}.", name)))
    }

    async fn close_app(&self, name: &str) -> CollabResult {
        info!(app = name, "closing application");
        // pkill exits nonzero when nothing matched, which here means the
        // app was not running.
        let status = Command::new("pkill")
            .args(["-x", name])
            .kill_on_drop(true)
            .status()
            .await?;
        if status.success() {
            Ok(ActionOutcome::ok(format!("Closed {}.", name)))
        } else {
            Err(CollaboratorError::NotFound(format!(
                "{} is not running",
                name
            )))
        }
    }

    async fn set_volume(&self, percent: u8) -> CollabResult {
        let script = format!("set volume output volume {}", percent);
        Self::run("osascript", &["-e", &script]).await?;
        Ok(ActionOutcome::ok(format!(
            "Volume set to {} percent.",
            percent
        )))
    }

    async fn move_file(&self, source: &str, destination: &str) -> CollabResult {
        if tokio::fs::metadata(source).await.is_err() {
            return Err(CollaboratorError::NotFound(format!(
                "{} does not exist",
                source
            )));
        }
        tokio::fs::rename(source, destination).await?;
        Ok(ActionOutcome::ok(format!(
            "Moved {} to {}.",
            source, destination
        )))
    }

    async fn delete_file(&self, path: &str) -> CollabResult {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(CollaboratorError::NotFound(format!(
                "{} does not exist",
                path
            )));
        }
        tokio::fs::remove_file(path).await?;
        Ok(ActionOutcome::ok(format!("Deleted {}.", path)))
    }

    async fn shutdown(&self) -> CollabResult {
        info!("shutting the machine down");
        Self::run(
            "osascript",
            &["-e", "tell app \"System Events\" to shut down"],
        )
        .await?;
        Ok(ActionOutcome::ok("Shutting down. Goodbye."))
    }
}
