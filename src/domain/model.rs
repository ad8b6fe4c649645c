use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

pub const OWNER_FIELD: &str = "Patient DID";
pub const HASH_FIELD: &str = "SHA-256 Hash";
pub const SAMPLE_ID_FIELD: &str = "Sample ID";
pub const GATEWAY_LINK_PREFIX: &str = "https://ipfs.io/ipfs/";

/// 輸入陣列中的一筆樣本，原樣保留所有欄位與順序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// 取出文字欄位；數字或布林以 JSON 文字呈現，null 視為不存在
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn owner_did(&self) -> String {
        self.text_field(OWNER_FIELD)
            .unwrap_or_else(|| "Unknown_DID".to_string())
    }

    pub fn data_hash(&self, index: usize) -> String {
        self.text_field(HASH_FIELD)
            .unwrap_or_else(|| format!("hash_{}", index))
    }
}

/// One element of the input array. Non-object elements keep their position
/// and fail on their own when the run reaches them.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEntry {
    Record(Record),
    NotAnObject { found: &'static str },
}

/// Content identifier assigned by IPFS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cid(String);

impl Cid {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn gateway_link(&self) -> String {
        format!("{}{}", GATEWAY_LINK_PREFIX, self.0)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub data_hash: String,
    pub ipfs_link: String,
    #[serde(rename = "ownerDID")]
    pub owner_did: String,
}

impl UploadResult {
    pub fn new(record: &Record, index: usize, cid: &Cid) -> Self {
        Self {
            data_hash: record.data_hash(index),
            ipfs_link: cid.gateway_link(),
            owner_did: record.owner_did(),
        }
    }
}

/// A record written to its own JSON file, ready for upload.
#[derive(Debug, Clone)]
pub struct SplitFile {
    pub file_name: String,
    /// Path relative to the storage root.
    pub relative_path: String,
    /// Path on disk, as handed to external tools.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: String,
    pub succeeded: bool,
    pub diagnostic: String,
}

impl StepOutcome {
    pub fn ok(step: &str) -> Self {
        Self {
            step: step.to_string(),
            succeeded: true,
            diagnostic: String::new(),
        }
    }

    pub fn failed(step: &str, diagnostic: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            succeeded: false,
            diagnostic: diagnostic.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub cid: Cid,
    /// Pin / MFS copy results; empty for backends that pin on upload.
    pub follow_ups: Vec<StepOutcome>,
}

impl UploadReceipt {
    pub fn new(cid: Cid) -> Self {
        Self {
            cid,
            follow_ups: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.follow_ups.iter().all(|s| s.succeeded)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.follow_ups.iter().filter(|s| !s.succeeded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Split,
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Split => f.write_str("split"),
            Stage::Upload => f.write_str("upload"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Uploaded {
        index: usize,
        file_name: String,
        cid: Cid,
        complete: bool,
    },
    Failed {
        index: usize,
        stage: Stage,
        reason: String,
    },
}

impl RecordOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, RecordOutcome::Uploaded { .. })
    }
}

/// Transform stage output: per-record outcomes plus the results to record.
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub outcomes: Vec<RecordOutcome>,
    pub results: Vec<UploadResult>,
}

impl UploadBatch {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_uploaded()).count()
    }

    pub fn incomplete(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Uploaded { complete: false, .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub incomplete: usize,
    pub output_path: String,
}
