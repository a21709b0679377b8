use std::sync::Arc;

use claims::{claim_for_all, ClaimsSettings};
use config::{Config, Workflow, CONFIG_FILE_PATH};
use faucet::{mint_for_all, FaucetSettings};
use http::HttpExecutor;
use logger::init_default_logger;
use report::log_summary;
use retry::TokioSleeper;
use utils::{ClaimsInputs, FaucetInputs};

mod claims;
mod config;
mod constants;
mod errors;
mod faucet;
mod http;
mod logger;
mod proxy;
mod report;
mod retry;
mod signer;
mod utils;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::read_default().await?;
    let _guard = init_default_logger(config.level_filter()?);

    if !config.loaded_from_file {
        tracing::warn!("{CONFIG_FILE_PATH} not found, using default settings");
    }

    let executor = Arc::new(HttpExecutor::new(config.ip_check_url.clone()));
    let sleeper = Arc::new(TokioSleeper);

    let reports = match config.workflow {
        Workflow::Faucet => {
            let inputs = FaucetInputs::read_default().await?;
            mint_for_all(inputs, FaucetSettings::from(&config), executor, sleeper).await
        }
        Workflow::Claims => {
            let inputs = ClaimsInputs::read_default().await?;
            claim_for_all(inputs, ClaimsSettings::from(&config), &*executor, &*sleeper).await
        }
    }
    .inspect_err(|e| tracing::error!("Run aborted: {e}"))?;

    log_summary(&format!("{:?} workflow", config.workflow), &reports);

    Ok(())
}
