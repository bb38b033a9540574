//! Operator script execution.
//!
//! Scripts run through `bash` with their arguments passed as argv, so no
//! argument is ever re-parsed by a shell.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to start script: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("script timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("script exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Runs the script with `args` and returns its standard output.
    async fn run(&self, args: &[String]) -> Result<String, ScriptError>;
}

/// Runs one fixed script with `bash`, from a fixed working directory.
pub struct ShellScriptRunner {
    script: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

impl ShellScriptRunner {
    pub fn new(script: PathBuf, working_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            script,
            working_dir,
            timeout,
        }
    }
}

#[async_trait]
impl ScriptRunner for ShellScriptRunner {
    async fn run(&self, args: &[String]) -> Result<String, ScriptError> {
        let mut cmd = tokio::process::Command::new("bash");
        cmd.arg(&self.script)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::info!("running {} {}", self.script.display(), args.join(" "));
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ScriptError::Timeout(self.timeout))??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ScriptError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: if stderr.is_empty() { stdout } else { stderr },
            });
        }
        Ok(stdout)
    }
}
