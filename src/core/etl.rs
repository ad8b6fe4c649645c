use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting upload run...");

        // Extract：輸入檔有問題就整個中止
        let entries = self.pipeline.extract().await?;
        let total = entries.len();
        tracing::info!("📥 Loaded {} records", total);

        // Transform：逐筆切分、上傳，單筆失敗只記錄不中止
        let batch = self.pipeline.transform(entries).await?;
        let uploaded = batch.results.len();
        let failed = batch.failed();
        let incomplete = batch.incomplete();
        tracing::info!("📤 Uploaded {} of {} records ({} failed)", uploaded, total, failed);

        // Load
        let output_path = self.pipeline.load(batch).await?;
        tracing::info!("💾 Results saved to: {}", output_path);

        Ok(RunSummary {
            total,
            uploaded,
            failed,
            incomplete,
            output_path,
        })
    }
}
