//! Relay client errors

use thiserror::Error;
use types::ResponseError;

/// Relay communication specific errors
#[derive(Error, Debug)]
pub enum RelayError {
    /// Simulation requested on a relay configured without a simulation endpoint
    #[error("no simulation endpoint for relay {relay}")]
    MissingSimulationEndpoint { relay: String },

    /// Batch construction inputs differ in length
    #[error("must initialize with same length inputs: {keys} signing keys, {names} names, {endpoints} endpoints")]
    LengthMismatch {
        keys: usize,
        names: usize,
        endpoints: usize,
    },

    /// Two relays in one batch share a name
    #[error("duplicate relay name: {relay}")]
    DuplicateRelay { relay: String },

    /// The HTTP client could not be built from the transport settings
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The JSON-RPC request could not be serialized
    #[error("failed to serialize {method} request for relay {relay}: {source}")]
    Serialization {
        relay: String,
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be signed
    #[error("failed to sign request for relay {relay}: {source}")]
    Signing {
        relay: String,
        #[source]
        source: alloy::signers::Error,
    },

    /// Connection or protocol failure before a response arrived
    #[error("HTTP transport error from relay {relay}: {source}")]
    Transport {
        relay: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be read
    #[error("failed to read response body from relay {relay}: {source}")]
    BodyRead {
        relay: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape
    #[error("invalid response from relay {relay}: {source}")]
    Response {
        relay: String,
        #[source]
        source: ResponseError,
    },
}

impl RelayError {
    /// Whether the error comes from how the client was set up rather than from a request
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RelayError::MissingSimulationEndpoint { .. }
                | RelayError::LengthMismatch { .. }
                | RelayError::DuplicateRelay { .. }
                | RelayError::HttpClient(_)
        )
    }
}
