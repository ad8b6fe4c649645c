use crate::core::{SplitFile, Storage, Uploader};
use crate::domain::model::{Cid, UploadReceipt};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, path: &str, data: &[u8]) {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned()
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| {
            EtlError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        PathBuf::from("/mock").join(path)
    }
}

/// Hands out `Qm<file stem>` CIDs and fails for the configured file names.
#[derive(Clone, Default)]
pub struct StubUploader {
    failing: HashSet<String>,
    uploaded: Arc<Mutex<Vec<String>>>,
}

impl StubUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    pub async fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().await.clone()
    }
}

#[async_trait]
impl Uploader for StubUploader {
    fn backend_name(&self) -> &'static str {
        "stub"
    }

    async fn upload(&self, file: &SplitFile) -> Result<UploadReceipt> {
        if self.failing.contains(&file.file_name) {
            return Err(EtlError::GatewayStatusError {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.uploaded.lock().await.push(file.file_name.clone());
        let stem = file.file_name.trim_end_matches(".json");
        let cid = Cid::parse(&format!("Qm{}", stem)).ok_or_else(|| EtlError::MissingCidError {
            message: "empty stub cid".to_string(),
        })?;
        Ok(UploadReceipt::new(cid))
    }
}
