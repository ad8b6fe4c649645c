use crate::config::{PacingConfig, SplitConfig};
use crate::core::loader::load_records;
use crate::core::pacing::Pacer;
use crate::core::recorder::Recorder;
use crate::core::splitter::{split_record, FileNamer};
use crate::core::{InputEntry, Pipeline, Record, SplitFile, Storage, Uploader};
use crate::domain::model::{RecordOutcome, Stage, UploadBatch, UploadReceipt, UploadResult};
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub input_path: String,
    pub split: SplitConfig,
    pub output_path: String,
}

/// Split → upload → record, one record at a time in input order.
pub struct UploadPipeline<S: Storage, U: Uploader> {
    storage: S,
    uploader: U,
    settings: PipelineSettings,
    pacer: Pacer,
}

impl<S: Storage, U: Uploader> UploadPipeline<S, U> {
    pub fn new(storage: S, uploader: U, settings: PipelineSettings, pacing: PacingConfig) -> Self {
        Self {
            storage,
            uploader,
            settings,
            pacer: Pacer::new(pacing),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// 顯示每筆記錄會得到的檔名，不寫檔也不上傳；非物件元素為 `None`
    pub fn plan_file_names(&self, entries: &[InputEntry]) -> Vec<Option<String>> {
        let mut namer = FileNamer::new(
            self.settings.split.file_naming(),
            self.settings.split.fallback_prefix.clone(),
        );
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                InputEntry::Record(record) => Some(format!("{}.json", namer.name_for(record, index))),
                InputEntry::NotAnObject { .. } => None,
            })
            .collect()
    }

    async fn process_record(
        &self,
        namer: &mut FileNamer,
        index: usize,
        record: &Record,
    ) -> std::result::Result<(SplitFile, UploadReceipt), (Stage, EtlError)> {
        let stem = namer.name_for(record, index);
        let split = split_record(&self.storage, &self.settings.split.dir, record, &stem)
            .await
            .map_err(|e| (Stage::Split, e))?;

        self.pacer.before_upload().await;
        let receipt = self
            .uploader
            .upload(&split)
            .await
            .map_err(|e| (Stage::Upload, e))?;

        Ok((split, receipt))
    }
}

#[async_trait::async_trait]
impl<S: Storage, U: Uploader> Pipeline for UploadPipeline<S, U> {
    async fn extract(&self) -> Result<Vec<InputEntry>> {
        tracing::debug!("Loading records from {}", self.settings.input_path);
        load_records(&self.storage, &self.settings.input_path).await
    }

    async fn transform(&self, data: Vec<InputEntry>) -> Result<UploadBatch> {
        let mut namer = FileNamer::new(
            self.settings.split.file_naming(),
            self.settings.split.fallback_prefix.clone(),
        );
        let mut recorder = Recorder::new();
        let mut outcomes = Vec::with_capacity(data.len());

        for (index, entry) in data.iter().enumerate() {
            let record = match entry {
                InputEntry::Record(record) => record,
                InputEntry::NotAnObject { found } => {
                    tracing::error!(
                        "❌ Error processing entry {} ({} stage): expected a JSON object, found {}",
                        index,
                        Stage::Split,
                        found
                    );
                    outcomes.push(RecordOutcome::Failed {
                        index,
                        stage: Stage::Split,
                        reason: format!("entry is not a JSON object (found {})", found),
                    });
                    self.pacer.after_record(false).await;
                    continue;
                }
            };

            let outcome = match self.process_record(&mut namer, index, record).await {
                Ok((split, receipt)) => {
                    for step in receipt.failed_steps() {
                        tracing::warn!(
                            "⚠️ {} for {} did not succeed: {}",
                            step.step,
                            split.file_name,
                            step.diagnostic
                        );
                    }
                    tracing::info!("✅ Uploaded {} -> CID: {}", split.file_name, receipt.cid);

                    recorder.record(UploadResult::new(record, index, &receipt.cid));
                    RecordOutcome::Uploaded {
                        index,
                        complete: receipt.is_complete(),
                        file_name: split.file_name,
                        cid: receipt.cid,
                    }
                }
                Err((stage, e)) => {
                    tracing::error!("❌ Error processing entry {} ({} stage): {}", index, stage, e);
                    RecordOutcome::Failed {
                        index,
                        stage,
                        reason: e.to_string(),
                    }
                }
            };

            self.pacer.after_record(outcome.is_uploaded()).await;
            outcomes.push(outcome);
        }

        Ok(UploadBatch {
            outcomes,
            results: recorder.into_results(),
        })
    }

    async fn load(&self, batch: UploadBatch) -> Result<String> {
        Recorder::from(batch.results)
            .write(&self.storage, &self.settings.output_path)
            .await?;
        Ok(self
            .storage
            .resolve(&self.settings.output_path)
            .display()
            .to_string())
    }
}
