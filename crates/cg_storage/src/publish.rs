use std::process::Stdio;
use std::sync::Arc;

use cg_core::config::PublishSettings;
use cg_core::{DocumentStore, Error, Result};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Placeholder in the configured arguments that receives the file path.
pub const FILE_PLACEHOLDER: &str = "{file}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub filename: String,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub app_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Runs the external publishing tool against a saved document.
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn DocumentStore>,
    settings: PublishSettings,
}

impl Publisher {
    pub fn new(store: Arc<dyn DocumentStore>, settings: PublishSettings) -> Self {
        Self { store, settings }
    }

    /// Starts publishing in a background task. The receiver yields the
    /// outcome once the tool exits or the timeout fires.
    pub fn spawn(&self, request: PublishRequest) -> oneshot::Receiver<Result<PublishOutcome>> {
        let (tx, rx) = oneshot::channel();
        let publisher = self.clone();
        tokio::spawn(async move {
            let outcome = publisher.publish(request).await;
            if tx.send(outcome).is_err() {
                warn!("publish result dropped, caller went away");
            }
        });
        rx
    }

    pub async fn publish(&self, request: PublishRequest) -> Result<PublishOutcome> {
        let path = self.store.resolve(&request.filename)?;
        let path = path.to_string_lossy();
        let args: Vec<String> = self
            .settings
            .args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, &path))
            .collect();

        let mut command = Command::new(&self.settings.command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(app_id) = request.app_id.as_ref().or(self.settings.app_id.as_ref()) {
            command.env("WECHAT_APP_ID", app_id);
        }
        if let Some(secret) = request.app_secret.as_ref().or(self.settings.app_secret.as_ref()) {
            command.env("WECHAT_APP_SECRET", secret);
        }

        info!("🚀 Publishing {} with {}", request.filename, self.settings.command);
        let output = match tokio::time::timeout(self.settings.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(command = %self.settings.command, error = %e, "failed to start publisher");
                return Err(Error::PublishFailure {
                    message: format!("无法启动 {}: {}", self.settings.command, e),
                    stdout: None,
                    stderr: None,
                });
            }
            Err(_) => {
                warn!(timeout = ?self.settings.timeout, "publisher timed out, child killed");
                return Err(Error::PublishFailure {
                    message: format!("发布超时（{} 秒）", self.settings.timeout.as_secs()),
                    stdout: None,
                    stderr: None,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            warn!(status = %output.status, "publisher exited with failure");
            return Err(Error::PublishFailure {
                message: format!("{} 退出状态 {}", self.settings.command, output.status),
                stdout: Some(stdout),
                stderr: Some(stderr),
            });
        }

        info!("✅ Published {}", request.filename);
        Ok(PublishOutcome {
            success: true,
            message: "发布成功".to_string(),
            stdout: Some(stdout),
            stderr: Some(stderr),
        })
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("command", &self.settings.command)
            .field("args", &self.settings.args)
            .field("timeout", &self.settings.timeout)
            .finish()
    }
}
