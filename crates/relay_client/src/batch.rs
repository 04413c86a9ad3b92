//! Fan-out of bundle requests to several relays at once

use std::collections::{HashMap, HashSet};

use alloy::signers::local::PrivateKeySigner;
use futures::future::join_all;
use types::{Bundle, RelayEndpoint, TransportConfig};

use crate::{
    client::{build_http_client, RelayClient, RelayReply},
    error::RelayError,
};

/// Per-relay outcome of a batch operation, keyed by relay name
pub type BatchResults = HashMap<String, Result<RelayReply, RelayError>>;

/// Set of relay clients addressed together
#[derive(Debug, Clone)]
pub struct BatchRelayClient {
    clients: Vec<RelayClient>,
}

impl BatchRelayClient {
    /// Build one client per `(signing key, name, endpoint)` triple.
    ///
    /// All clients share one HTTP client built from `transport`. None of
    /// them has a simulation endpoint.
    pub fn new(
        signing_keys: Vec<PrivateKeySigner>,
        names: Vec<String>,
        endpoints: Vec<String>,
        transport: &TransportConfig,
    ) -> Result<Self, RelayError> {
        if signing_keys.len() != names.len() || names.len() != endpoints.len() {
            return Err(RelayError::LengthMismatch {
                keys: signing_keys.len(),
                names: names.len(),
                endpoints: endpoints.len(),
            });
        }

        let http_client = build_http_client(transport)?;
        let clients = signing_keys
            .into_iter()
            .zip(names)
            .zip(endpoints)
            .map(|((key, name), endpoint)| {
                RelayClient::with_http_client(key, name, endpoint, None, http_client.clone())
            })
            .collect();

        Self::from_clients(clients)
    }

    /// Build clients from relay descriptors, keeping their simulation endpoints
    pub fn from_endpoints(
        endpoints: Vec<RelayEndpoint>,
        transport: &TransportConfig,
    ) -> Result<Self, RelayError> {
        let http_client = build_http_client(transport)?;
        let clients = endpoints
            .into_iter()
            .map(|endpoint| RelayClient::from_endpoint(endpoint, http_client.clone()))
            .collect();

        Self::from_clients(clients)
    }

    /// Group existing clients; relay names must be unique
    pub fn from_clients(clients: Vec<RelayClient>) -> Result<Self, RelayError> {
        let mut seen = HashSet::new();
        for client in &clients {
            if !seen.insert(client.name()) {
                return Err(RelayError::DuplicateRelay {
                    relay: client.name().to_string(),
                });
            }
        }

        tracing::debug!(relay_count = clients.len(), "Created batch relay client");
        Ok(Self { clients })
    }

    pub fn clients(&self) -> &[RelayClient] {
        &self.clients
    }

    /// Relay names, in construction order
    pub fn relay_names(&self) -> Vec<String> {
        self.clients
            .iter()
            .map(|client| client.name().to_string())
            .collect()
    }

    /// Get a specific relay client
    pub fn get_client(&self, relay_name: &str) -> Option<&RelayClient> {
        self.clients.iter().find(|client| client.name() == relay_name)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Send a bundle to every relay concurrently.
    ///
    /// Every relay gets an entry in the result; one relay failing does not
    /// affect the others.
    pub async fn send_bundle<T>(&self, bundle: &Bundle<T>) -> BatchResults {
        let requests = self.clients.iter().map(|client| async move {
            (client.name().to_string(), client.send_bundle(bundle).await)
        });
        let results: BatchResults = join_all(requests).await.into_iter().collect();

        log_batch_outcome("eth_sendBundle", &results);
        results
    }

    /// Simulate a bundle on every relay concurrently.
    ///
    /// Relays without a simulation endpoint report
    /// [`RelayError::MissingSimulationEndpoint`].
    pub async fn simulate_bundle<T: Clone>(&self, bundle: &Bundle<T>) -> BatchResults {
        let requests = self.clients.iter().map(|client| async move {
            (client.name().to_string(), client.simulate_bundle(bundle).await)
        });
        let results: BatchResults = join_all(requests).await.into_iter().collect();

        log_batch_outcome("eth_callBundle", &results);
        results
    }
}

fn log_batch_outcome(method: &str, results: &BatchResults) {
    let failed = results.values().filter(|result| result.is_err()).count();
    for (relay, result) in results {
        if let Err(e) = result {
            tracing::warn!(relay = %relay, method = method, error = %e, "Relay request failed");
        }
    }
    tracing::info!(
        method = method,
        relays = results.len(),
        failed = failed,
        "Batch request completed"
    );
}
