use std::fmt;

use crate::{
    errors::{EntryError, PipelineError},
    signer::AccountAddress,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    SkippedInvalidInput(String),
    SkippedProxyUnhealthy,
    TerminalApiFailure(String),
    ExhaustedRetries(String),
    /// The entry's task panicked or was cancelled before producing an outcome
    Aborted(String),
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SkippedInvalidInput(_) => "skipped (invalid input)",
            Self::SkippedProxyUnhealthy => "skipped (proxy unhealthy)",
            Self::TerminalApiFailure(_) => "terminal API failure",
            Self::ExhaustedRetries(_) => "retries exhausted",
            Self::Aborted(_) => "aborted",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success | Self::SkippedProxyUnhealthy => f.write_str(self.label()),
            Self::SkippedInvalidInput(reason)
            | Self::TerminalApiFailure(reason)
            | Self::ExhaustedRetries(reason)
            | Self::Aborted(reason) => write!(f, "{}: {reason}", self.label()),
        }
    }
}

impl From<EntryError> for Outcome {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::ProxyUnhealthy(_) => Self::SkippedProxyUnhealthy,
            other => Self::SkippedInvalidInput(other.to_string()),
        }
    }
}

impl From<PipelineError> for Outcome {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Terminal { reason, .. } => Self::TerminalApiFailure(reason),
            exhausted @ PipelineError::ExhaustedRetries { .. } => {
                Self::ExhaustedRetries(exhausted.to_string())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryReport {
    /// 1-based line number in the input files
    pub index: usize,
    pub address: Option<AccountAddress>,
    pub outcome: Outcome,
}

pub fn log_summary(workflow: &str, reports: &[EntryReport]) {
    tracing::info!("========================================================================");
    tracing::info!("{workflow} finished for {} entries", reports.len());

    for report in reports {
        let address = report
            .address
            .map_or_else(|| "<unknown address>".to_string(), |a| a.to_string());

        match report.outcome {
            Outcome::Success => tracing::info!("#{} {address}: {}", report.index, report.outcome),
            _ => tracing::warn!("#{} {address}: {}", report.index, report.outcome),
        }
    }

    let succeeded = reports
        .iter()
        .filter(|r| r.outcome == Outcome::Success)
        .count();
    tracing::info!(
        "Succeeded: {succeeded}, failed or skipped: {}",
        reports.len() - succeeded
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_errors_map_to_skips() {
        assert_eq!(
            Outcome::from(EntryError::ProxyUnhealthy("u@h:1".into())),
            Outcome::SkippedProxyUnhealthy
        );
        assert!(matches!(
            Outcome::from(EntryError::InvalidKeyLength(3)),
            Outcome::SkippedInvalidInput(_)
        ));
        assert!(matches!(
            Outcome::from(EntryError::MalformedProxy("x".into())),
            Outcome::SkippedInvalidInput(_)
        ));
    }

    #[test]
    fn pipeline_errors_keep_their_distinction() {
        assert_eq!(
            Outcome::from(PipelineError::Terminal {
                attempts: 1,
                reason: "registered".into()
            }),
            Outcome::TerminalApiFailure("registered".into())
        );
        assert!(matches!(
            Outcome::from(PipelineError::ExhaustedRetries {
                attempts: 10,
                last_error: "timeout".into()
            }),
            Outcome::ExhaustedRetries(_)
        ));
    }

    #[test]
    fn display_includes_reason() {
        assert_eq!(Outcome::Success.to_string(), "success");
        assert_eq!(
            Outcome::TerminalApiFailure("registered".into()).to_string(),
            "terminal API failure: registered"
        );
    }
}
