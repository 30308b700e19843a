use clap::Parser;
use trip_journal::core::ConfigProvider;
use trip_journal::utils::{logger, validation::Validate};
use trip_journal::{
    CliConfig, ContentfulClient, FixedClock, JournalEngine, JournalError, JournalPipeline,
    LocalStorage,
};

fn exit_with(e: &JournalError) -> ! {
    tracing::error!(
        "❌ Site data build failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting trip-journal CLI");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut source = ContentfulClient::from_config(&config);
    if let Some(timeout) = config.request_timeout() {
        source = source.with_timeout(timeout).unwrap_or_else(|e| exit_with(&e));
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let today = config.today;
    let pipeline = JournalPipeline::new(storage, config, source);
    let pipeline = match today {
        Some(day) => {
            tracing::info!("📅 Building as of {}", day);
            pipeline.with_clock(FixedClock(day))
        }
        None => pipeline,
    };

    // Ctrl-C 時放棄尚未完成的請求
    let token = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling fetch");
            token.cancel();
        }
    });

    let engine = JournalEngine::new(pipeline);
    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Site data built successfully!");
            println!("✅ Site data built successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(JournalError::Cancelled) => {
            tracing::warn!("Build cancelled, nothing written");
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
