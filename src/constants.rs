use std::time::Duration;

pub const FAUCET_URL: &str = "https://faucet.testnet.bardock.movementnetwork.xyz";
pub const CLAIMS_URL: &str = "https://claims.movementnetwork.xyz";
pub const IP_CHECK_URL: &str = "https://ipinfo.io";

pub const MINT_AMOUNT: u64 = 1_000_000_000;

// Returned by the claims API when the wallet has been submitted before
pub const ALREADY_REGISTERED_ERROR: &str = "Aptos account registered already";

// FILES
pub const PRIVATE_KEYS_FILE_PATH: &str = "data/private_keys.txt";
pub const PROXIES_FILE_PATH: &str = "data/proxies.txt";
pub const OKX_WALLETS_FILE_PATH: &str = "data/okx_wallets.txt";
pub const OKX_UIDS_FILE_PATH: &str = "data/okx_uids.txt";

pub const LOGS_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "claimer.log";

// RETRIES
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
pub const DEFAULT_NONCE_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_SUBMIT_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_ENTRY_DELAY: Duration = Duration::from_secs(5);

// BROWSER
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const SEC_CH_UA: &str = "\"Not/A)Brand\";v=\"8\", \"Chromium\";v=\"126\", \"Google Chrome\";v=\"126\"";
