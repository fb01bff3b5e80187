//! `sync_env`: bring the working environment up to date.
//!
//! Runs the configured shell command in the configured directory.

use std::process::Stdio;

use async_trait::async_trait;
use promptos_core::config::{expand_home, SyncEnvConfig};
use promptos_core::types::CommandResult;
use tokio::process::Command;

use crate::action::Action;
use crate::error::ActionError;

pub struct SyncEnvAction {
    config: SyncEnvConfig,
}

impl SyncEnvAction {
    pub fn new(config: SyncEnvConfig) -> Self {
        Self { config }
    }

    fn shell_command(&self) -> Command {
        #[cfg(target_os = "windows")]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        };
        #[cfg(not(target_os = "windows"))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(&self.config.command)
            .current_dir(expand_home(&self.config.working_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Last non-blank line of a process stream.
fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl Action for SyncEnvAction {
    fn name(&self) -> &'static str {
        "sync_env"
    }

    async fn run(&self) -> Result<CommandResult, ActionError> {
        if self.config.command.trim().is_empty() {
            return Err(ActionError::Failed("no sync command configured".to_string()));
        }

        tracing::info!(
            command = %self.config.command,
            working_dir = %self.config.working_dir,
            "Syncing environment"
        );

        let output = self.shell_command().output().await?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let detail = [&output.stderr, &output.stdout]
                .into_iter()
                .map(|stream| last_line(stream))
                .find(|line| !line.is_empty())
                .unwrap_or_else(|| "no output".to_string());
            tracing::warn!(code, detail = %detail, "Environment sync failed");
            return Err(ActionError::CommandFailed {
                command: self.config.command.clone(),
                code,
                detail,
            });
        }

        let summary = last_line(&output.stdout);
        let message = if summary.is_empty() {
            "Ambiente sincronizado".to_string()
        } else {
            format!("Ambiente sincronizado: {}", summary)
        };
        Ok(CommandResult::success(message).with_speak(self.config.speak))
    }

    fn describe(&self) -> String {
        format!("Run `{}` in {}", self.config.command, self.config.working_dir)
    }
}
