//! Local-daemon backend: drives the `ipfs` command-line client.
//!
//! `add` must succeed for the record to count as uploaded. `pin add` and
//! `files cp` are reported as [`StepOutcome`]s; they only fail the record
//! when `strict_pinning` is set.

use crate::config::LocalDaemonConfig;
use crate::core::{SplitFile, Uploader};
use crate::domain::model::{Cid, StepOutcome, UploadReceipt};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::process::Output;
use tokio::process::Command;

pub struct LocalDaemonUploader {
    config: LocalDaemonConfig,
}

impl LocalDaemonUploader {
    pub fn new(config: LocalDaemonConfig) -> Self {
        Self { config }
    }

    fn describe<I, S>(&self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut line = self.config.ipfs_bin.clone();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.as_ref().to_string_lossy());
        }
        line
    }

    async fn run<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S> + Clone,
        S: AsRef<OsStr>,
    {
        let command = self.describe(args.clone());
        tracing::debug!("Running {}", command);

        Command::new(&self.config.ipfs_bin)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EtlError::CommandError {
                command,
                status: "not started".to_string(),
                stderr: e.to_string(),
            })
    }

    async fn add(&self, file: &SplitFile) -> Result<Cid> {
        let args = [OsStr::new("add"), OsStr::new("-Q"), file.path.as_os_str()];
        let output = self.run(args).await?;

        if !output.status.success() {
            return Err(command_error(self.describe(args), &output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Cid::parse(&stdout).ok_or_else(|| EtlError::MissingCidError {
            message: format!("'{}' printed no CID", self.describe(args)),
        })
    }

    /// Runs a follow-up command and captures its outcome instead of failing.
    async fn follow_up(&self, step: &str, args: &[&str]) -> StepOutcome {
        match self.run(args.iter().copied()).await {
            Ok(output) if output.status.success() => StepOutcome::ok(step),
            Ok(output) => {
                let err = command_error(self.describe(args.iter().copied()), &output);
                StepOutcome::failed(step, err.to_string())
            }
            Err(e) => StepOutcome::failed(step, e.to_string()),
        }
    }

    fn mfs_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.config.mfs_root.trim_end_matches('/'), file_name)
    }
}

fn command_error(command: String, output: &Output) -> EtlError {
    EtlError::CommandError {
        command,
        status: output
            .status
            .code()
            .map(|c| format!("exit code {}", c))
            .unwrap_or_else(|| "terminated by signal".to_string()),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[async_trait]
impl Uploader for LocalDaemonUploader {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, file: &SplitFile) -> Result<UploadReceipt> {
        let cid = self.add(file).await?;

        // 釘選避免被垃圾回收，再複製到 MFS 讓 IPFS Desktop 的 Files 頁面看得到
        let pin = self.follow_up("pin", &["pin", "add", cid.as_str()]).await;
        let ipfs_path = format!("/ipfs/{}", cid);
        let mfs_path = self.mfs_path(&file.file_name);
        let copy = self
            .follow_up("mfs-copy", &["files", "cp", ipfs_path.as_str(), mfs_path.as_str()])
            .await;

        let receipt = UploadReceipt {
            cid,
            follow_ups: vec![pin, copy],
        };

        if self.config.strict_pinning {
            if let Some(failed) = receipt.failed_steps().next() {
                return Err(EtlError::ProcessingError {
                    message: format!(
                        "{} step failed for CID {}: {}",
                        failed.step, receipt.cid, failed.diagnostic
                    ),
                });
            }
        }

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mfs_path_joins_root() {
        let uploader = LocalDaemonUploader::new(LocalDaemonConfig::default());
        assert_eq!(uploader.mfs_path("S1.json"), "/S1.json");

        let nested = LocalDaemonUploader::new(LocalDaemonConfig {
            mfs_root: "/genomics/".to_string(),
            ..LocalDaemonConfig::default()
        });
        assert_eq!(nested.mfs_path("S1.json"), "/genomics/S1.json");
    }

    #[tokio::test]
    async fn test_missing_binary_is_command_error() {
        let uploader = LocalDaemonUploader::new(LocalDaemonConfig {
            ipfs_bin: "/nonexistent/ipfs-binary".to_string(),
            ..LocalDaemonConfig::default()
        });
        let file = SplitFile {
            file_name: "S1.json".to_string(),
            relative_path: "split/S1.json".to_string(),
            path: "split/S1.json".into(),
            bytes: b"{}".to_vec(),
        };

        let err = uploader.upload(&file).await.unwrap_err();
        assert!(matches!(err, EtlError::CommandError { .. }));
    }
}
