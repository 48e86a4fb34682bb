use btc_price_tracker::{config::Settings, services::tracker_service, utils::logging::init_logging};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging();

    info!("Starting Bitcoin price tracker");

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Configuration loaded successfully");

    match tracker_service::run(&settings).await {
        Ok(summary) => {
            info!(
                "Bitcoin price tracker finished: {} documents written",
                summary.written()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Bitcoin price tracker failed during {}: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
