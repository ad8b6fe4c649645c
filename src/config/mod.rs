#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::retry::RetryPolicy;
use crate::core::splitter::FileNaming;
use crate::domain::model::SAMPLE_ID_FIELD;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "genomic_data_with_did_hash.json";
pub const DEFAULT_SPLIT_DIR: &str = "split_json_files";
pub const DEFAULT_LOCAL_OUTPUT: &str = "genomic_output.json";
pub const DEFAULT_GATEWAY_OUTPUT: &str = "uploaded_cids.json";
pub const DEFAULT_GATEWAY_ENDPOINT: &str = "https://ipfs.infura.io:5001/api/v0/add";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputConfig,
    pub split: SplitConfig,
    pub output: OutputConfig,
    pub backend: BackendConfig,
    pub pacing: Option<PacingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_INPUT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    IdField,
    Index,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub dir: String,
    pub naming: NamingMode,
    pub id_field: String,
    pub fallback_prefix: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_SPLIT_DIR.to_string(),
            naming: NamingMode::IdField,
            id_field: SAMPLE_ID_FIELD.to_string(),
            fallback_prefix: "Sample".to_string(),
        }
    }
}

impl SplitConfig {
    pub fn file_naming(&self) -> FileNaming {
        match self.naming {
            NamingMode::IdField => FileNaming::IdField(self.id_field.clone()),
            NamingMode::Index => FileNaming::Index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 未設定時依後端選擇預設檔名
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    Local(LocalDaemonConfig),
    Gateway(GatewayConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Local(LocalDaemonConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDaemonConfig {
    pub ipfs_bin: String,
    /// MFS directory the uploaded files are copied into.
    pub mfs_root: String,
    /// Treat a failed pin or MFS copy as a failed record.
    pub strict_pinning: bool,
}

impl Default for LocalDaemonConfig {
    fn default() -> Self {
        Self {
            ipfs_bin: "ipfs".to_string(),
            mfs_root: "/".to_string(),
            strict_pinning: false,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub project_id: String,
    pub project_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project_id", &self.project_id)
            .field("project_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub credentials: Option<Credentials>,
    pub retry_limit: u32,
    pub backoff_base_ms: u64,
    pub timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GATEWAY_ENDPOINT.to_string(),
            credentials: None,
            retry_limit: 3,
            backoff_base_ms: 1000,
            timeout_secs: None,
        }
    }
}

impl GatewayConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_limit, Duration::from_millis(self.backoff_base_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PacingConfig {
    None,
    /// Sleep after every record.
    Fixed { delay_ms: u64 },
    /// Pause after every `every` successful uploads.
    Batch { every: u32, pause_secs: u64 },
    /// Take one token per upload.
    TokenBucket { capacity: u32, refill_per_sec: f64 },
}

impl Settings {
    pub fn output_path(&self) -> &str {
        match (&self.output.path, &self.backend) {
            (Some(path), _) => path,
            (None, BackendConfig::Local(_)) => DEFAULT_LOCAL_OUTPUT,
            (None, BackendConfig::Gateway(_)) => DEFAULT_GATEWAY_OUTPUT,
        }
    }

    pub fn pacing(&self) -> PacingConfig {
        match (&self.pacing, &self.backend) {
            (Some(pacing), _) => pacing.clone(),
            (None, BackendConfig::Local(_)) => PacingConfig::Fixed { delay_ms: 100 },
            (None, BackendConfig::Gateway(_)) => PacingConfig::Batch {
                every: 50,
                pause_secs: 10,
            },
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            BackendConfig::Local(_) => "local",
            BackendConfig::Gateway(_) => "gateway",
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::require_text("input.path", &self.input.path)?;
        validation::require_text("split.dir", &self.split.dir)?;
        validation::require_text("output.path", self.output_path())?;
        validation::require_text("split.fallback_prefix", &self.split.fallback_prefix)?;
        if self.split.naming == NamingMode::IdField {
            validation::require_text("split.id_field", &self.split.id_field)?;
        }

        match &self.backend {
            BackendConfig::Local(local) => {
                validation::require_text("backend.ipfs_bin", &local.ipfs_bin)?;
                validation::require_text("backend.mfs_root", &local.mfs_root)?;
            }
            BackendConfig::Gateway(gateway) => {
                validation::require_http_endpoint("backend.endpoint", &gateway.endpoint)?;
                validation::require_within("backend.retry_limit", gateway.retry_limit, 1..=10)?;
                if let Some(timeout) = gateway.timeout_secs {
                    validation::require_within("backend.timeout_secs", timeout, 1..=3600)?;
                }
            }
        }

        match self.pacing() {
            PacingConfig::Batch { every, .. } => {
                validation::require_within("pacing.every", every, 1..=100_000)?;
            }
            PacingConfig::TokenBucket {
                capacity,
                refill_per_sec,
            } => {
                validation::require_within("pacing.capacity", capacity, 1..=100_000)?;
                validation::require_within("pacing.refill_per_sec", refill_per_sec, 0.001..=10_000.0)?;
            }
            PacingConfig::None | PacingConfig::Fixed { .. } => {}
        }

        Ok(())
    }
}
