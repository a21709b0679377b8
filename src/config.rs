use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing_subscriber::filter::LevelFilter;

use crate::constants::{
    CLAIMS_URL, DEFAULT_ENTRY_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_NONCE_RETRY_DELAY,
    DEFAULT_SUBMIT_RETRY_DELAY, FAUCET_URL, IP_CHECK_URL, MINT_AMOUNT,
};

pub const CONFIG_FILE_PATH: &str = "data/config.toml";

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    #[default]
    Faucet,
    Claims,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    pub workflow: Workflow,
    pub faucet_url: String,
    pub mint_amount: u64,
    pub claims_url: String,
    pub ip_check_url: String,
    pub max_attempts: usize,
    pub nonce_retry_delay_ms: u64,
    pub submit_retry_delay_ms: u64,
    pub entry_delay_ms: u64,
    pub faucet_max_attempts: Option<usize>,
    pub faucet_retry_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,

    #[serde(skip)]
    pub loaded_from_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workflow: Workflow::default(),
            faucet_url: FAUCET_URL.to_string(),
            mint_amount: MINT_AMOUNT,
            claims_url: CLAIMS_URL.to_string(),
            ip_check_url: IP_CHECK_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            nonce_retry_delay_ms: DEFAULT_NONCE_RETRY_DELAY.as_millis() as u64,
            submit_retry_delay_ms: DEFAULT_SUBMIT_RETRY_DELAY.as_millis() as u64,
            entry_delay_ms: DEFAULT_ENTRY_DELAY.as_millis() as u64,
            faucet_max_attempts: None,
            faucet_retry_delay_ms: 0,
            request_timeout_secs: None,
            log_level: "info".to_string(),
            loaded_from_file: false,
        }
    }
}

impl Config {
    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        Ok(Self {
            loaded_from_file: true,
            ..Self::from_toml(&cfg_str)?
        })
    }

    fn from_toml(cfg_str: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(cfg_str)?)
    }

    /// Reads `data/config.toml`, falling back to defaults when the file is absent.
    /// Runs before the logger exists, so the fallback is reported by the caller.
    pub async fn read_default() -> eyre::Result<Self> {
        if !tokio::fs::try_exists(CONFIG_FILE_PATH).await? {
            return Ok(Self::default());
        }

        Self::read_from_file(CONFIG_FILE_PATH).await
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn level_filter(&self) -> eyre::Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| eyre::eyre!("Invalid LOG_LEVEL: {}", self.log_level))
    }
}
