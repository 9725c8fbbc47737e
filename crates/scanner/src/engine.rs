//! External scan engine invocation.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::task::{RegistryAuth, ScanTask};

/// Raw report produced by the engine (JSON text).
pub type RawReport = String;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch scan engine: {0}")]
    Launch(String),

    #[error("scan engine exited with status {code}: {detail}")]
    Failed { code: i32, detail: String },

    #[error("failed to read engine report: {0}")]
    Report(String),
}

/// Seam to the scanning binary.
///
/// Implementations run exactly one scan per call and return the raw JSON
/// report; interpretation of findings is not this service's business.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    async fn scan(&self, task: &ScanTask) -> Result<RawReport, EngineError>;
}

/// Options forwarded to the external benchmark binary.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Scan timeout, passed through verbatim (e.g. `5m`).
    pub timeout: Option<String>,
    /// Allow plain-HTTP/self-signed registries.
    pub insecure: bool,
    /// Comma-separated checkpoint codes to skip.
    pub ignore: Option<String>,
    /// Path to a registry CA certificate.
    pub cert_path: Option<String>,
}

/// Engine that shells out to an external benchmark scanner.
///
/// The report goes through a temp file; stdout/stderr are diagnostics only
/// and are folded into the error on a non-zero exit.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    command: String,
    options: EngineOptions,
}

impl CommandEngine {
    pub fn new(command: impl Into<String>, options: EngineOptions) -> Self {
        Self {
            command: command.into(),
            options,
        }
    }

    fn build_args(&self, task: &ScanTask, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-f".into(), "json".into()];

        if let RegistryAuth::Basic { username, password } = &task.auth {
            args.push("--username".into());
            args.push(username.clone());
            args.push("--password".into());
            args.push(password.clone());
        }

        if let Some(timeout) = &self.options.timeout {
            args.push("-t".into());
            args.push(timeout.clone());
        }
        if self.options.insecure {
            args.push("--insecure".into());
        }
        if let Some(ignore) = &self.options.ignore {
            args.push("--ignore".into());
            args.push(ignore.clone());
        }
        if let Some(cert_path) = &self.options.cert_path {
            args.push("--cert-path".into());
            args.push(cert_path.clone());
        }

        args.push("--output".into());
        args.push(output.to_string_lossy().into_owned());
        args.push(task.image.clone());

        args
    }
}

#[async_trait]
impl ScanEngine for CommandEngine {
    async fn scan(&self, task: &ScanTask) -> Result<RawReport, EngineError> {
        let report_file = tempfile::NamedTempFile::new()
            .map_err(|e| EngineError::Report(format!("create report temp file: {e}")))?;

        let args = self.build_args(task, report_file.path());
        debug!(command = %self.command, image = %task.image, "launching scan engine");

        let output = tokio::process::Command::new(&self.command)
            .args(&args)
            .output()
            .await
            .map_err(|e| EngineError::Launch(e.to_string()))?;

        if !output.status.success() {
            let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if detail.is_empty() {
                detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(EngineError::Failed {
                code: output.status.code().unwrap_or(-1),
                detail,
            });
        }

        tokio::fs::read_to_string(report_file.path())
            .await
            .map_err(|e| EngineError::Report(e.to_string()))
    }
}
