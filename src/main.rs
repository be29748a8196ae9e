use flight_booking_client::config::ClientConfig;
use flight_booking_client::controller::WorkflowController;
use flight_booking_client::utils::error::ClientResult;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

// Boot the page the way the browser does on load and print the result
#[tokio::main]
async fn main() -> ClientResult<()> {
    let config = ClientConfig::from_env()?;
    init_tracing();
    tracing::info!(api = %config.api_base_url, "Starting flight booking client");

    let controller = WorkflowController::from_config(&config)?;
    controller.start().await;

    print!("{}", controller.page().render_document());
    Ok(())
}
