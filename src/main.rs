use clap::Parser;
use treasury_fetch::config::{API_DOCUMENTATION_URL, OUTPUT_FILE_NAME};
use treasury_fetch::core::summary;
use treasury_fetch::utils::error::ErrorSeverity;
use treasury_fetch::utils::logger;
use treasury_fetch::{CliConfig, EtlEngine, LocalStorage};

fn rule() -> String {
    "=".repeat(80)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    println!("{}", rule());
    println!("FETCHING US TREASURY SECURITIES FROM OFFICIAL GOVERNMENT SOURCES");
    println!("{}", rule());
    println!("\nData Source: US Department of Treasury - Fiscal Data API");
    println!("API Base URL: {}", config.api.base_url);
    println!("Date: {}", chrono::Local::now().format("%B %d, %Y"));
    println!();

    let storage = LocalStorage::new(config.output_dir.clone());
    let engine = EtlEngine::for_treasury(config.api.clone(), storage);

    match engine.run().await {
        Ok(run) => {
            let result_set = &run.portfolio.result_set;

            println!("\nData Retrieved Successfully!");
            println!("Source: {}", run.portfolio.source);
            println!("Total records: {}", result_set.len());
            println!("\nColumns available: {:?}", result_set.columns());
            println!("\nFirst few records:");
            print!("{}", summary::render_preview(result_set, config.preview_rows));

            println!("\n✓ Saved raw data to: {}", run.output_path);

            println!("\n{}", rule());
            println!("DATA SUMMARY");
            println!("{}", rule());
            print!("{}", summary::render_describe(&summary::describe(result_set)));
        }
        Err(e) => {
            tracing::error!(
                "❌ Fetch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("\n✗ ERROR: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            eprintln!(
                "No data written to {}. API documentation: {}",
                OUTPUT_FILE_NAME, API_DOCUMENTATION_URL
            );

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

    println!("\n{}", rule());
    println!("SCRIPT COMPLETE");
    println!("{}", rule());

    Ok(())
}
