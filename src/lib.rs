pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{gateway::GatewayUploader, ipfs_cli::LocalDaemonUploader, storage::LocalStorage};
pub use config::Settings;
pub use core::{etl::EtlEngine, pipeline::UploadPipeline};
pub use domain::model::{RunSummary, UploadResult};
pub use utils::error::{EtlError, Result};
