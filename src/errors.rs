use thiserror::Error;

/// Per-entry failures detected before (or instead of) the real workflow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("malformed proxy descriptor: {0}")]
    MalformedProxy(String),

    #[error("invalid private key length: expected 64 hex characters, got {0}")]
    InvalidKeyLength(usize),

    #[error("private key is not valid hex: {0}")]
    InvalidKeyEncoding(String),

    #[error("proxy {0} failed the health check")]
    ProxyUnhealthy(String),
}

/// Classification of a single HTTP attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Transport failure, non-2xx status or an unusable body. Worth another attempt.
    #[error("retryable: {0}")]
    Retryable(String),

    /// The server declared the request permanently unsatisfiable.
    #[error("terminal: {0}")]
    Terminal(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("terminal failure after {attempts} attempt(s): {reason}")]
    Terminal { attempts: usize, reason: String },

    #[error("retries exhausted after {attempts} attempt(s), last error: {last_error}")]
    ExhaustedRetries { attempts: usize, last_error: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("input files have mismatched lengths: {0}")]
    LengthMismatch(String),
}
