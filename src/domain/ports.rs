use crate::domain::model::{InputEntry, SplitFile, UploadBatch, UploadReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Location handed to external tools for a storage-relative path.
    fn resolve(&self, path: &str) -> PathBuf;
}

/// Submits one split file to IPFS and reports the CID.
#[async_trait]
pub trait Uploader: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn upload(&self, file: &SplitFile) -> Result<UploadReceipt>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<InputEntry>>;
    async fn transform(&self, data: Vec<InputEntry>) -> Result<UploadBatch>;
    async fn load(&self, batch: UploadBatch) -> Result<String>;
}
