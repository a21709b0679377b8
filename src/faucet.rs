use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::task::JoinSet;
use tracing::{field, Instrument, Span};

use crate::{
    config::Config,
    http::{faucet_headers, RequestExecutor, RequestParams},
    proxy::ProxyHandle,
    report::{EntryReport, Outcome},
    retry::{send_with_retries, RetryPolicy, Sleeper},
    signer::{AccountAddress, SignerIdentity},
    utils::{FaucetEntry, FaucetInputs},
};

#[derive(Clone, Debug)]
pub struct FaucetSettings {
    pub faucet_url: String,
    pub mint_amount: u64,
    pub policy: RetryPolicy,
    pub request_timeout: Option<Duration>,
}

impl From<&Config> for FaucetSettings {
    fn from(config: &Config) -> Self {
        Self {
            faucet_url: config.faucet_url.clone(),
            mint_amount: config.mint_amount,
            policy: RetryPolicy::unbounded(
                config.faucet_max_attempts,
                Duration::from_millis(config.faucet_retry_delay_ms),
            ),
            request_timeout: config.request_timeout(),
        }
    }
}

pub fn mint_request(faucet_url: &str, amount: u64, address: &AccountAddress) -> RequestParams {
    RequestParams::post(format!("{faucet_url}/mint"), faucet_headers()).with_query(vec![
        ("amount".to_string(), amount.to_string()),
        ("address".to_string(), address.to_string()),
    ])
}

async fn mint(
    executor: &dyn RequestExecutor,
    sleeper: &dyn Sleeper,
    settings: &FaucetSettings,
    entry: &FaucetEntry,
) -> (Option<AccountAddress>, Outcome) {
    let span = Span::current();

    let identity = match SignerIdentity::from_secret_key(&entry.private_key) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("Skipping entry: {e}");
            return (None, e.into());
        }
    };
    let address = identity.address();
    span.record("address", field::display(address));

    let proxy = match ProxyHandle::parse(&entry.proxy, settings.request_timeout) {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::error!("Skipping entry: {e}");
            return (Some(address), e.into());
        }
    };
    span.record("proxy", field::display(&proxy.descriptor));

    tracing::info!("Requesting {} tokens for {address}", settings.mint_amount);

    let request = mint_request(&settings.faucet_url, settings.mint_amount, &address);
    match send_with_retries(executor, &request, &proxy, settings.policy, sleeper).await {
        Ok(response) => {
            tracing::info!("Request for {address} succeeded: {response}");
            (Some(address), Outcome::Success)
        }
        Err(e) => {
            tracing::error!("Request for {address} failed: {e}");
            (Some(address), e.into())
        }
    }
}

/// Fires one mint pipeline per entry concurrently and waits for all of them.
pub async fn mint_for_all(
    inputs: FaucetInputs,
    settings: FaucetSettings,
    executor: Arc<dyn RequestExecutor>,
    sleeper: Arc<dyn Sleeper>,
) -> eyre::Result<Vec<EntryReport>> {
    let entries = inputs.into_entries()?;
    let total = entries.len();
    let settings = Arc::new(settings);

    let mut handles = JoinSet::new();

    for (i, entry) in entries.into_iter().enumerate() {
        let index = i + 1;
        let executor = executor.clone();
        let sleeper = sleeper.clone();
        let settings = settings.clone();

        let span = tracing::info_span!(
            "entry",
            index,
            address = field::Empty,
            proxy = field::Empty
        );

        handles.spawn(
            async move {
                let (address, outcome) = mint(&*executor, &*sleeper, &settings, &entry).await;
                EntryReport {
                    index,
                    address,
                    outcome,
                }
            }
            .instrument(span),
        );
    }

    let mut reports = Vec::with_capacity(total);
    while let Some(res) = handles.join_next().await {
        match res {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("Mint task aborted: {e}"),
        }
    }

    // A panicked task leaves no report behind; account for it by index
    let reported: HashSet<usize> = reports.iter().map(|report| report.index).collect();
    for index in (1..=total).filter(|index| !reported.contains(index)) {
        reports.push(EntryReport {
            index,
            address: None,
            outcome: Outcome::Aborted("mint task did not complete".to_string()),
        });
    }

    reports.sort_by_key(|report| report.index);
    tracing::info!("All requests completed.");

    Ok(reports)
}
