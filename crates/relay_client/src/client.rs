//! Individual relay client implementation

use std::{
    borrow::Cow,
    time::{Duration, Instant},
};

use alloy::signers::local::PrivateKeySigner;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Serialize;
use types::{
    relay::{BUNDLE_STATS_METHOD, CALL_BUNDLE_METHOD, SEND_BUNDLE_METHOD},
    utils::{body_to_string, is_unset_state_block},
    Bundle, BundleStats, BundleStatsParams, ExecutionError, JsonRpcRequest, RelayEndpoint,
    ResponseError, TransportConfig,
};

use crate::{
    error::RelayError,
    response,
    signer::{RelaySigner, SIGNATURE_HEADER},
};

/// Build the HTTP client relay requests go through
pub fn build_http_client(transport: &TransportConfig) -> Result<Client, RelayError> {
    Client::builder()
        .timeout(Duration::from_secs(transport.timeout_seconds))
        .connect_timeout(Duration::from_secs(transport.connect_timeout_seconds))
        .pool_idle_timeout(Duration::from_secs(transport.pool_idle_timeout_seconds))
        .pool_max_idle_per_host(transport.pool_max_idle_per_host)
        .user_agent(transport.user_agent.as_str())
        .build()
        .map_err(RelayError::HttpClient)
}

/// Outcome of a completed HTTP exchange with a relay.
///
/// Any status code counts as a completed exchange; the body is kept
/// untouched so callers can run it through [`crate::response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    /// Raw response body
    pub body: Vec<u8>,
    /// HTTP status code
    pub status: u16,
    /// Time from sending the request until the body was read
    pub duration: Duration,
}

impl RelayReply {
    /// Body as text, with invalid UTF-8 replaced
    pub fn body_text(&self) -> String {
        body_to_string(&self.body)
    }

    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn gas_used(&self) -> Result<u64, ResponseError> {
        response::extract_gas_used(&self.body)
    }

    pub fn bundle_hash(&self) -> Result<String, ResponseError> {
        response::extract_bundle_hash(&self.body)
    }

    pub fn execution_errors(&self) -> Result<Vec<ExecutionError>, ResponseError> {
        response::extract_execution_errors(&self.body)
    }
}

/// HTTP client for a single relay
#[derive(Debug, Clone)]
pub struct RelayClient {
    name: String,
    signer: RelaySigner,
    main_endpoint: String,
    simulation_endpoint: Option<String>,
    http_client: Client,
}

impl RelayClient {
    /// Create a relay client with its own HTTP client using default transport settings
    pub fn new(
        signing_key: PrivateKeySigner,
        name: impl Into<String>,
        main_endpoint: impl Into<String>,
        simulation_endpoint: Option<String>,
    ) -> Result<Self, RelayError> {
        let http_client = build_http_client(&TransportConfig::default())?;
        Ok(Self::with_http_client(
            signing_key,
            name,
            main_endpoint,
            simulation_endpoint,
            http_client,
        ))
    }

    /// Create a relay client on top of an existing HTTP client
    pub fn with_http_client(
        signing_key: PrivateKeySigner,
        name: impl Into<String>,
        main_endpoint: impl Into<String>,
        simulation_endpoint: Option<String>,
        http_client: Client,
    ) -> Self {
        Self {
            name: name.into(),
            signer: RelaySigner::new(signing_key),
            main_endpoint: main_endpoint.into(),
            simulation_endpoint: simulation_endpoint.filter(|endpoint| !endpoint.is_empty()),
            http_client,
        }
    }

    pub fn from_endpoint(endpoint: RelayEndpoint, http_client: Client) -> Self {
        Self::with_http_client(
            endpoint.signing_key,
            endpoint.name,
            endpoint.main_endpoint,
            endpoint.simulation_endpoint,
            http_client,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn main_endpoint(&self) -> &str {
        &self.main_endpoint
    }

    pub fn simulation_endpoint(&self) -> Option<&str> {
        self.simulation_endpoint.as_deref()
    }

    pub fn signer(&self) -> &RelaySigner {
        &self.signer
    }

    /// Submit a bundle with `eth_sendBundle` to the main endpoint.
    ///
    /// The reply body is returned as is; nothing is inferred from it here.
    pub async fn send_bundle<T>(&self, bundle: &Bundle<T>) -> Result<RelayReply, RelayError> {
        tracing::info!(
            relay = %self.name,
            target_block = %bundle.block_number(),
            tx_count = bundle.len(),
            "Submitting bundle to relay"
        );

        let request = JsonRpcRequest::new(SEND_BUNDLE_METHOD, bundle);
        self.signed_request(&self.main_endpoint, &request).await
    }

    /// Simulate a bundle with `eth_callBundle` against the simulation endpoint.
    ///
    /// An unset state block is sent as `latest`. The caller's bundle is not modified.
    pub async fn simulate_bundle<T: Clone>(
        &self,
        bundle: &Bundle<T>,
    ) -> Result<RelayReply, RelayError> {
        let endpoint = self.simulation_endpoint.as_deref().ok_or_else(|| {
            RelayError::MissingSimulationEndpoint {
                relay: self.name.clone(),
            }
        })?;

        let bundle = if is_unset_state_block(bundle.state_block_number()) {
            let mut normalized = bundle.clone();
            normalized.normalize_state_block();
            Cow::Owned(normalized)
        } else {
            Cow::Borrowed(bundle)
        };

        tracing::info!(
            relay = %self.name,
            target_block = %bundle.block_number(),
            state_block = %bundle.state_block_number(),
            tx_count = bundle.len(),
            "Simulating bundle on relay"
        );

        let request = JsonRpcRequest::new(CALL_BUNDLE_METHOD, &*bundle);
        self.signed_request(endpoint, &request).await
    }

    /// Query `flashbots_getBundleStats` for a submitted bundle.
    ///
    /// Both arguments are hex strings and are sent verbatim.
    pub async fn get_bundle_stats(
        &self,
        bundle_hash: &str,
        block_number: &str,
    ) -> Result<(BundleStats, Duration), RelayError> {
        let request = JsonRpcRequest::new(
            BUNDLE_STATS_METHOD,
            BundleStatsParams {
                bundle_hash: bundle_hash.to_string(),
                block_number: block_number.to_string(),
            },
        );
        let reply = self.signed_request(&self.main_endpoint, &request).await?;

        let stats = serde_json::from_slice(&reply.body).map_err(|source| RelayError::Response {
            relay: self.name.clone(),
            source: ResponseError::InvalidJson {
                raw: reply.body_text(),
                source,
            },
        })?;

        Ok((stats, reply.duration))
    }

    /// Serialize, sign and POST a JSON-RPC request, then read the whole body
    async fn signed_request<P: Serialize>(
        &self,
        endpoint: &str,
        request: &JsonRpcRequest<P>,
    ) -> Result<RelayReply, RelayError> {
        let body = serde_json::to_vec(request).map_err(|source| RelayError::Serialization {
            relay: self.name.clone(),
            method: request.method,
            source,
        })?;

        let signature = self
            .signer
            .signature_header(&body)
            .map_err(|source| RelayError::Signing {
                relay: self.name.clone(),
                source,
            })?;

        tracing::debug!(
            relay = %self.name,
            method = request.method,
            endpoint = %endpoint,
            signer = %self.signer.address().to_checksum(None),
            body_len = body.len(),
            "Sending signed request"
        );

        let start = Instant::now();
        let response = self
            .http_client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|source| RelayError::Transport {
                relay: self.name.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| RelayError::BodyRead {
                relay: self.name.clone(),
                source,
            })?
            .to_vec();
        let duration = start.elapsed();

        if status.is_success() {
            tracing::debug!(
                relay = %self.name,
                method = request.method,
                status = status.as_u16(),
                elapsed_ms = duration.as_millis() as u64,
                "Relay responded"
            );
        } else {
            tracing::warn!(
                relay = %self.name,
                method = request.method,
                status = status.as_u16(),
                elapsed_ms = duration.as_millis() as u64,
                body = %body_to_string(&body),
                "Relay returned non-success status"
            );
        }

        Ok(RelayReply {
            body,
            status: status.as_u16(),
            duration,
        })
    }
}
