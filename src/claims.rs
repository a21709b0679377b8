use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{field, Instrument, Span};

use crate::{
    config::Config,
    errors::{EntryError, ExecError, PipelineError},
    http::{ClaimsHeaders, RequestExecutor, RequestParams},
    proxy::ProxyHandle,
    report::{EntryReport, Outcome},
    retry::{retry_with_policy, send_with_retries, RetryPolicy, Sleeper},
    signer::{claim_message, AccountAddress, SignerIdentity},
    utils::{ClaimsEntry, ClaimsInputs},
};

const SEPARATOR: &str = "========================================================================";

#[derive(Clone, Debug)]
pub struct ClaimsSettings {
    pub claims_url: String,
    pub nonce_policy: RetryPolicy,
    pub submit_policy: RetryPolicy,
    pub entry_delay: Duration,
    pub request_timeout: Option<Duration>,
}

impl From<&Config> for ClaimsSettings {
    fn from(config: &Config) -> Self {
        Self {
            claims_url: config.claims_url.clone(),
            nonce_policy: RetryPolicy::bounded(
                config.max_attempts,
                Duration::from_millis(config.nonce_retry_delay_ms),
            ),
            submit_policy: RetryPolicy::bounded(
                config.max_attempts,
                Duration::from_millis(config.submit_retry_delay_ms),
            ),
            entry_delay: Duration::from_millis(config.entry_delay_ms),
            request_timeout: config.request_timeout(),
        }
    }
}

#[derive(Deserialize)]
struct NonceResponse {
    nonce: Option<String>,
}

async fn fetch_nonce(
    executor: &dyn RequestExecutor,
    sleeper: &dyn Sleeper,
    settings: &ClaimsSettings,
    headers: &ClaimsHeaders,
    proxy: &ProxyHandle,
) -> Result<String, PipelineError> {
    let request = RequestParams::get(
        format!("{}/api/get-nonce", settings.claims_url),
        headers.nonce.clone(),
    );
    let request = &request;

    retry_with_policy("Fetching nonce", settings.nonce_policy, sleeper, |attempt| async move {
        tracing::info!("Attempt {attempt} to fetch nonce...");

        executor
            .execute(request, proxy)
            .await
            .and_then(|response| match serde_json::from_value::<NonceResponse>(response) {
                Ok(NonceResponse { nonce: Some(nonce) }) if !nonce.is_empty() => Ok(nonce),
                _ => Err(ExecError::Retryable("response carries no nonce".to_string())),
            })
    })
    .await
}

/// Health check, nonce, signature, submission. Any failure ends only this entry.
async fn process_entry(
    executor: &dyn RequestExecutor,
    sleeper: &dyn Sleeper,
    settings: &ClaimsSettings,
    headers: &ClaimsHeaders,
    entry: &ClaimsEntry,
) -> (Option<AccountAddress>, Outcome) {
    let identity = match SignerIdentity::from_secret_key(&entry.private_key) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("Skipping entry: {e}");
            return (None, e.into());
        }
    };
    let address = identity.address();
    Span::current().record("address", field::display(address));

    let proxy = match ProxyHandle::parse(&entry.proxy, settings.request_timeout) {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::error!("Skipping entry: {e}");
            return (Some(address), e.into());
        }
    };
    Span::current().record("proxy", field::display(&proxy.descriptor));
    tracing::info!("Proxy: {}", proxy.descriptor);

    if !executor.verify_proxy(&proxy).await {
        tracing::error!("Skipping entry due to invalid proxy");
        return (
            Some(address),
            EntryError::ProxyUnhealthy(proxy.descriptor.to_string()).into(),
        );
    }
    tracing::info!("Proxy passed. Proceeding");

    tracing::info!("Fetching nonce...");
    let nonce = match fetch_nonce(executor, sleeper, settings, headers, &proxy).await {
        Ok(nonce) => nonce,
        Err(e) => {
            tracing::error!("Failed to fetch nonce: {e}");
            return (Some(address), e.into());
        }
    };
    tracing::info!("Received nonce: {nonce}");

    tracing::info!("Signing message...");
    let message = claim_message(&address, &settings.claims_url, &nonce);
    let signature = identity.sign(message.as_bytes());
    let public_key = identity.public_key();

    tracing::info!("Address: {address}");
    tracing::debug!("Public Key: {public_key}");
    tracing::debug!("Message: {message}");
    tracing::debug!("Signature: {signature}");

    let body = json!({
        "okxUid": entry.okx_uid,
        "okxWallet": entry.okx_wallet,
        "walletDetails": {
            "address": address.to_string(),
            "message": message,
            "signature": signature,
            "publicKey": public_key,
            "nonce": nonce,
        },
    });
    let request = RequestParams::post(
        format!("{}/api/okx/check", settings.claims_url),
        headers.submit.clone(),
    )
    .with_json(body);

    tracing::info!("Sending data to /okx/check...");
    match send_with_retries(executor, &request, &proxy, settings.submit_policy, sleeper).await {
        Ok(response) => {
            let pretty =
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string());
            tracing::info!("Response from check: {pretty}");
            tracing::info!("Successfully processed entry");
            (Some(address), Outcome::Success)
        }
        Err(e) => {
            tracing::error!("Failed to process entry: {e}");
            (Some(address), e.into())
        }
    }
}

/// Processes entries one at a time, pausing after each entry that got past the proxy check.
pub async fn claim_for_all(
    inputs: ClaimsInputs,
    settings: ClaimsSettings,
    executor: &dyn RequestExecutor,
    sleeper: &dyn Sleeper,
) -> eyre::Result<Vec<EntryReport>> {
    let entries = inputs.into_entries()?;
    let headers = ClaimsHeaders::new(&settings.claims_url)?;

    let total = entries.len();
    let mut reports = Vec::with_capacity(total);

    for (i, entry) in entries.iter().enumerate() {
        let index = i + 1;
        tracing::info!("Processing NEW ACCOUNT {index}...");

        let span = tracing::info_span!(
            "entry",
            index,
            address = field::Empty,
            proxy = field::Empty
        );
        let (address, outcome) = process_entry(executor, sleeper, &settings, &headers, entry)
            .instrument(span)
            .await;
        let skipped = matches!(
            outcome,
            Outcome::SkippedInvalidInput(_) | Outcome::SkippedProxyUnhealthy
        );

        tracing::info!("{SEPARATOR}");
        reports.push(EntryReport {
            index,
            address,
            outcome,
        });

        if !skipped && index < total && !settings.entry_delay.is_zero() {
            tracing::info!("NEXT ACCOUNT STARTING in {:?}...", settings.entry_delay);
            sleeper.sleep(settings.entry_delay).await;
        }
    }

    Ok(reports)
}
