use clap::Parser;
use ipfs_etl::config::BackendConfig;
use ipfs_etl::core::pipeline::PipelineSettings;
use ipfs_etl::core::{Pipeline, Uploader};
use ipfs_etl::utils::error::ErrorSeverity;
use ipfs_etl::utils::{logger, validation::Validate};
use ipfs_etl::{
    CliArgs, EtlEngine, EtlError, GatewayUploader, LocalDaemonUploader, LocalStorage, Settings,
    UploadPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting ipfs-etl");

    let settings = match args.settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    if args.verbose {
        tracing::debug!("Settings: {:?}", settings);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    let pipeline_settings = PipelineSettings {
        input_path: settings.input.path.clone(),
        split: settings.split.clone(),
        output_path: settings.output_path().to_string(),
    };
    tracing::info!(
        "📋 Backend: {}, input: {}, split dir: {}, output: {}",
        settings.backend_name(),
        pipeline_settings.input_path,
        pipeline_settings.split.dir,
        pipeline_settings.output_path
    );

    let result = match &settings.backend {
        BackendConfig::Local(local) => {
            let uploader = LocalDaemonUploader::new(local.clone());
            run(uploader, pipeline_settings, &settings, args.dry_run).await
        }
        BackendConfig::Gateway(gateway) => {
            if gateway.credentials.is_none() {
                tracing::warn!("No gateway credentials configured, uploading anonymously");
            }
            match GatewayUploader::new(gateway.clone()) {
                Ok(uploader) => run(uploader, pipeline_settings, &settings, args.dry_run).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Upload run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn run<U: Uploader>(
    uploader: U,
    pipeline_settings: PipelineSettings,
    settings: &Settings,
    dry_run: bool,
) -> ipfs_etl::Result<()> {
    let backend = uploader.backend_name();
    let pipeline = UploadPipeline::new(
        LocalStorage::default(),
        uploader,
        pipeline_settings,
        settings.pacing(),
    );

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written or uploaded");
        let entries = pipeline.extract().await?;
        let plan = pipeline.plan_file_names(&entries);
        for (index, name) in plan.iter().enumerate() {
            match name {
                Some(name) => tracing::info!("  [{}] {}/{}", index, pipeline.settings().split.dir, name),
                None => tracing::warn!("  [{}] skipped: not a JSON object", index),
            }
        }
        tracing::info!(
            "🔍 {} of {} records would be uploaded via the {} backend",
            plan.iter().flatten().count(),
            entries.len(),
            backend
        );
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline);
    let summary = engine.run().await?;

    if summary.incomplete > 0 {
        tracing::warn!(
            "⚠️ {} uploads were not fully pinned or copied into MFS",
            summary.incomplete
        );
    }
    println!(
        "\n✅ All files processed! {} of {} uploaded, {} failed. Results saved in '{}'.",
        summary.uploaded, summary.total, summary.failed, summary.output_path
    );
    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
