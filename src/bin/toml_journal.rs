use clap::Parser;
use trip_journal::core::itinerary::StopFilter;
use trip_journal::core::ConfigProvider;
use trip_journal::utils::{logger, validation::Validate};
use trip_journal::{
    ContentfulClient, FixedClock, JournalEngine, JournalError, JournalPipeline, LocalStorage,
    TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-journal")]
#[command(about = "Builds the travel journal's site data from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "journal.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the home timeline filter from config
    #[arg(long)]
    filter: Option<StopFilter>,

    /// Dry run - show what would be fetched without contacting the backend
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let verbose = args.verbose || config.verbose_logs();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based journal build");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(filter) = args.filter {
        config.transform.home_filter = Some(filter);
        tracing::info!("🔧 Home filter overridden to: {}", filter);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&config);
        return Ok(());
    }

    let mut source = ContentfulClient::from_config(&config);
    if let Some(timeout) = config.request_timeout() {
        source = source.with_timeout(timeout)?;
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let today = config.today_override();
    let pipeline = JournalPipeline::new(storage, config, source);
    let pipeline = match today {
        Some(day) => pipeline.with_clock(FixedClock(day)),
        None => pipeline,
    };

    let token = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling fetch");
            token.cancel();
        }
    });

    match JournalEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ Site data built successfully!");
            println!("✅ Site data built successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(JournalError::Cancelled) => {
            tracing::warn!("Build cancelled, nothing written");
        }
        Err(e) => {
            tracing::error!(
                "❌ Site data build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Site: {}", config.site.name);
    if let Some(description) = &config.site.description {
        println!("  Description: {}", description);
    }
    println!(
        "  Source: {} (space {}, environment {})",
        config.api_base(),
        config.space_id(),
        config.environment()
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Home filter: {}", config.home_filter());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Content Queries:");
    for content_type in trip_journal::domain::model::content_types::ALL {
        println!(
            "  {} (limit {}, include depth {})",
            content_type,
            config.entry_limit(),
            config.include_depth()
        );
    }
    if let Some(timeout) = config.request_timeout() {
        println!("  Timeout: {}s", timeout.as_secs());
    }

    println!();
    println!("📅 Date Handling:");
    match config.today_override() {
        Some(day) => println!("  Building as of {}", day),
        None => println!("  Using the local calendar day"),
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if config.compress() {
        println!("  Compression: {} (ZIP)", config.bundle_filename());
    } else {
        println!("  Files written separately");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
