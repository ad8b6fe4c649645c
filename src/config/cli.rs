use crate::config::{BackendConfig, Credentials, GatewayConfig, LocalDaemonConfig, Settings};
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// `ipfs` CLI talking to a local daemon
    Local,
    /// Hosted pinning gateway over HTTP
    Gateway,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ipfs-etl")]
#[command(about = "Split genomic sample records into files, upload them to IPFS and record the CIDs")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON array of sample records
    #[arg(short, long)]
    pub input: Option<String>,

    /// Directory for the per-record JSON files
    #[arg(long)]
    pub split_dir: Option<String>,

    /// Summary JSON file
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Gateway upload endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, env = "IPFS_PROJECT_ID")]
    pub project_id: Option<String>,

    #[arg(long, env = "IPFS_PROJECT_SECRET", hide_env_values = true)]
    pub project_secret: Option<String>,

    /// Fail records whose pin or MFS copy failed (local backend)
    #[arg(long)]
    pub strict_pinning: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Dry run - show the split file names without writing or uploading
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// 載入設定檔（若有）並套用命令列覆蓋設定
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input.path = input.clone();
        }
        if let Some(dir) = &self.split_dir {
            settings.split.dir = dir.clone();
        }
        if let Some(output) = &self.output {
            settings.output.path = Some(output.clone());
        }

        match (self.backend, &settings.backend) {
            (Some(BackendKind::Local), BackendConfig::Gateway(_)) => {
                settings.backend = BackendConfig::Local(LocalDaemonConfig::default());
            }
            (Some(BackendKind::Gateway), BackendConfig::Local(_)) => {
                settings.backend = BackendConfig::Gateway(GatewayConfig::default());
            }
            _ => {}
        }

        match &mut settings.backend {
            BackendConfig::Local(local) => {
                if self.strict_pinning {
                    local.strict_pinning = true;
                }
                if self.endpoint.is_some() {
                    tracing::warn!("--endpoint is ignored by the local backend");
                }
            }
            BackendConfig::Gateway(gateway) => {
                if let Some(endpoint) = &self.endpoint {
                    gateway.endpoint = endpoint.clone();
                }
                if let Some(project_id) = &self.project_id {
                    let secret = self.project_secret.clone().unwrap_or_default();
                    gateway.credentials = Some(Credentials {
                        project_id: project_id.clone(),
                        project_secret: secret,
                    });
                } else if let (Some(secret), Some(credentials)) =
                    (&self.project_secret, gateway.credentials.as_mut())
                {
                    credentials.project_secret = secret.clone();
                }
            }
        }
    }
}
