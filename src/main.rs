use clap::Parser;
use store_smoke::domain::ports::SmokeSuite;
use store_smoke::utils::monitor::SystemMonitor;
use store_smoke::utils::{error::ErrorSeverity, logger, validation::Validate};
use store_smoke::{build_suites, CliConfig, FileConfig, SuiteRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json);

    tracing::info!("🚀 Starting store-smoke");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入配置
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match FileConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML");
                    std::process::exit(3);
                }
            }
        }
        None => FileConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(3);
    }

    let execution_id = cli
        .execution_id
        .clone()
        .unwrap_or_else(|| format!("smoke_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")));

    let only = CliConfig::parse_suite_list(&cli.only);
    let skip = CliConfig::parse_suite_list(&cli.skip);
    let suites = build_suites(&config, &only, &skip);

    display_run_summary(&config, &suites, &execution_id, &cli);

    if suites.is_empty() {
        eprintln!("❌ No suites selected (check --only/--skip and the enabled flags)");
        std::process::exit(2);
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no store will be touched");
        for suite in &suites {
            println!("  {} suite:", suite.name());
            for operation in suite.operations() {
                println!("    - {}", operation);
            }
        }
        return Ok(());
    }

    let mut monitor = SystemMonitor::new(config.monitoring_enabled());

    let mut runner = SuiteRunner::new(execution_id.clone());
    for suite in suites {
        runner.add_suite(suite);
    }

    match runner.execute_all().await {
        Ok(reports) => {
            let summary = SuiteRunner::get_execution_summary(&reports);
            tracing::info!("🎉 Smoke run completed successfully!");
            monitor.log_stats("Run finished");

            println!("✅ Smoke run completed successfully!");
            println!("🆔 Execution ID: {}", execution_id);
            println!("📊 Suites executed: {}", reports.len());
            if let Some(total_steps) = summary.get("total_steps") {
                println!("🧪 Operations: {}", total_steps);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Smoke run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

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

fn display_run_summary(
    config: &FileConfig,
    suites: &[Box<dyn SmokeSuite>],
    execution_id: &str,
    cli: &CliConfig,
) {
    println!("📋 Smoke Run Summary:");
    println!("  Name: {} v{}", config.suite.name, config.suite.version);
    if !config.suite.description.is_empty() {
        println!("  Description: {}", config.suite.description);
    }
    println!("  Execution ID: {}", execution_id);
    println!("  Suites: {}", suites.len());

    if cli.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    if let Some(only) = &cli.only {
        println!("  🎯 Only executing: {}", only);
    }
    if let Some(skip) = &cli.skip {
        println!("  ⏭️ Skipping: {}", skip);
    }

    println!();
    println!("📝 Execution Order:");
    for (index, suite) in suites.iter().enumerate() {
        println!(
            "  {}. {} ({} operations)",
            index + 1,
            suite.name(),
            suite.operations().len()
        );
    }
    println!();
}
