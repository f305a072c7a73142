use std::{process::ExitCode, sync::Arc};

use afb_core::config::Config;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = afb_core::logging::init("afb") {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!(error = %e, "no Discord token found; set DISCORD_TOKEN=your_token");
            return ExitCode::FAILURE;
        }
    };

    match afb_discord::router::run_gateway(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{e:#}"), "bot stopped");
            ExitCode::FAILURE
        }
    }
}
