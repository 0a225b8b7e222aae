use clap::Parser;
use prestashop_meta_sync::{
    log_error_card, log_sync_card, setup_logging, LogConfig, MetaSyncService, OpenAIGenerator,
    SyncConfig,
};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, warn};

/// Regenerates meta title, meta description and URL slug of PrestaShop products.
#[derive(Parser, Debug)]
#[command(name = "meta-sync", version)]
struct Args {
    /// Product ids to update, processed in order
    #[arg(required = true)]
    product_ids: Vec<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("meta-sync: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn Error + Send + Sync>> {
    if let Err(e) = dotenv::dotenv() {
        // a missing .env is fine, the variables may come from the environment
        eprintln!("meta-sync: no .env loaded ({e})");
    }

    setup_logging(LogConfig::default())?;

    let config = SyncConfig::from_env().map_err(|e| {
        e.log();
        e
    })?;
    let generator = Arc::new(OpenAIGenerator::from_config(&config.generation));
    let service = MetaSyncService::new(config, generator)?;

    let report = service.sync_products(&args.product_ids).await;

    for (product_id, result) in &report.results {
        match result {
            Ok(outcome) => {
                log_sync_card(outcome);
                match serde_json::to_string(outcome) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to serialize outcome"),
                }
            }
            Err(e) => log_error_card(*product_id, e),
        }
    }

    if report.failure_count() > 0 {
        error!(
            failed = report.failure_count(),
            total = args.product_ids.len(),
            "Some products were not updated"
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
