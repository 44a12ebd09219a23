use clap::Parser;
use coauthor_etl::domain::ports::ConfigProvider;
use coauthor_etl::utils::error::ErrorSeverity;
use coauthor_etl::utils::{logger, validation::Validate};
use coauthor_etl::{CoauthorPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-coauthors")]
#[command(about = "Coauthor graph builder driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "coauthors.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override traversal depth from config
    #[arg(long)]
    depth: Option<usize>,

    /// Dry run - show what would be fetched without sending requests
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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
    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("🚀 Starting TOML-based coauthor ETL");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(depth) = args.depth {
        config.traversal.depth = Some(depth);
        tracing::info!("🔧 Traversal depth overridden to: {}", depth);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match CoauthorPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Coauthor graph built successfully!");
            println!("✅ Coauthor graph built successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    println!("  Source: {}", config.base_url());
    println!("  Output: {}", config.output_path());
    println!(
        "  Formats: {}",
        config
            .output_formats()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("🌱 Seeds:");
    println!("  Named authors: {}", config.seed_authors().len());
    for name in config.seed_authors().iter().take(10) {
        println!("    - {}", name);
    }
    if config.seed_authors().len() > 10 {
        println!("    ... and {} more", config.seed_authors().len() - 10);
    }
    if let Some(query) = config.seed_query() {
        println!("  Venue query: {}", query.query);
        println!("  Page size: {}", query.page_size);
        if let Some(min_year) = query.min_year {
            println!("  Stops at publications before: {}", min_year);
        }
        if let Some(max) = query.max_publications {
            println!("  Max publications: {}", max);
        }
    }

    println!();
    println!("📚 Collaboration Scope:");
    let scope = config.scope();
    if scope.is_corpus() {
        println!("  Whole corpus (DBLP coauthor view)");
    } else {
        println!("  Venue: {}", scope.venue.as_deref().unwrap_or("any"));
        if let Some(since) = scope.since_year {
            println!("  Since year: {}", since);
        }
    }

    println!();
    println!("🔁 Traversal:");
    let traversal = config.traversal();
    println!("  Depth: {}", traversal.depth);
    println!("  Restrict to seeds: {}", traversal.restrict_to_seeds);
    match traversal.expand_top {
        Some(n) => println!("  Expand top: {}", n),
        None => println!("  Expand top: all coauthors"),
    }

    println!();
    println!("💾 Output Configuration:");
    let sunburst = config.sunburst();
    println!("  Root label: {}", sunburst.root_label);
    println!("  Top K: {}, tree depth: {}", sunburst.top_k, sunburst.tree_depth);
    for format in config.output_formats() {
        println!("  {} -> {}", format.as_str(), config.output_filename(format));
    }
    println!();
    println!("✅ Dry run completed - configuration looks good!");
}
