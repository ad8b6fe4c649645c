use crate::core::Storage;
use crate::domain::model::UploadResult;
use crate::utils::error::Result;

/// Collects one result per successful upload, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    results: Vec<UploadResult>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: UploadResult) {
        self.results.push(result);
    }

    pub fn into_results(self) -> Vec<UploadResult> {
        self.results
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.results)?)
    }

    pub async fn write<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        let json = self.to_json_pretty()?;
        storage.write_file(path, json.as_bytes()).await?;
        tracing::debug!("Wrote {} results to {}", self.results.len(), path);
        Ok(())
    }
}

impl From<Vec<UploadResult>> for Recorder {
    fn from(results: Vec<UploadResult>) -> Self {
        Self { results }
    }
}
