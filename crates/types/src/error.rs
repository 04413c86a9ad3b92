//! Error types for the bundle relay system

use thiserror::Error;

/// Boxed error produced by a transaction codec
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Bundle construction errors
#[derive(Error, Debug)]
pub enum BundleError {
    /// A transaction could not be encoded to its canonical binary form
    #[error("failed to encode transaction {tx_hash}: {source}")]
    Encoding {
        tx_hash: String,
        #[source]
        source: BoxError,
    },
}

/// Protocol errors raised while interpreting a relay response body.
///
/// Every variant keeps the raw body so callers can log exactly what the relay sent.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// The body is not valid JSON, or does not match the expected shape
    #[error("failed to decode relay response: {source} | raw: {raw}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// Neither a `result` object nor a top-level `error` is present
    #[error("malformed relay response, no result or error | raw: {raw}")]
    Malformed { raw: String },

    /// The `result` object is missing a field, or it has the wrong type
    #[error("relay response missing {field} | raw: {raw}")]
    MissingField { field: &'static str, raw: String },

    /// The relay answered with a top-level JSON-RPC error
    #[error("relay returned error: {error}")]
    Rejected { error: String, raw: String },
}

impl ResponseError {
    /// Raw response body attached to this error
    pub fn raw(&self) -> &str {
        match self {
            ResponseError::InvalidJson { raw, .. }
            | ResponseError::Malformed { raw }
            | ResponseError::MissingField { raw, .. }
            | ResponseError::Rejected { raw, .. } => raw,
        }
    }
}

/// Execution failure reported by a relay.
///
/// These are data returned to the caller, not call failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Top-level chain or RPC error, in its string form
    #[error("{0}")]
    Rpc(String),

    /// A single bundle transaction failed or reverted
    #[error("err: {error}, revertString: {revert}")]
    Transaction {
        /// Position of the transaction in the bundle results
        index: usize,
        tx_hash: Option<String>,
        error: String,
        revert: String,
    },
}

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Validation error
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}
