//! Relay-related types and structures

use alloy::signers::local::PrivateKeySigner;
use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON-RPC method for unconditional bundle submission
pub const SEND_BUNDLE_METHOD: &str = "eth_sendBundle";
/// JSON-RPC method for bundle simulation
pub const CALL_BUNDLE_METHOD: &str = "eth_callBundle";
/// JSON-RPC method for bundle stats
pub const BUNDLE_STATS_METHOD: &str = "flashbots_getBundleStats";

/// JSON-RPC 2.0 request envelope.
///
/// Field order is the wire order relays see and sign over.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P> {
    /// JSON-RPC version
    pub jsonrpc: &'static str,
    /// Method name
    pub method: &'static str,
    /// Request parameters
    pub params: Vec<P>,
    /// Request ID
    pub id: u64,
}

impl<P: Serialize> JsonRpcRequest<P> {
    /// Create a request with a single parameter object
    pub fn new(method: &'static str, param: P) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params: vec![param],
            id: 1,
        }
    }
}

/// Parameters for `flashbots_getBundleStats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BundleStatsParams {
    /// Bundle hash (hex)
    pub bundle_hash: String,
    /// Target block number (hex)
    pub block_number: String,
}

/// Response to `flashbots_getBundleStats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleStats {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub jsonrpc: String,
    pub result: BundleStatsResult,
}

/// Stats for a single submitted bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleStatsResult {
    pub is_high_priority: bool,
    pub is_sent_to_miners: bool,
    pub is_simulated: bool,
    pub sent_to_miners_at: Option<DateTime<Utc>>,
    pub simulated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A relay response body, classified by shape.
///
/// `result` counts only when it is a JSON object; otherwise a top-level
/// `error` key (any JSON value) wins, and anything else that is still
/// valid JSON is `Malformed`.
#[derive(Debug, Clone)]
pub enum RelayResponse {
    /// `result` holds an object
    Success { result: BundleResult },
    /// Top-level JSON-RPC error, of any JSON type
    Failure { error: Value },
    /// Valid JSON with neither of the above
    Malformed(Value),
}

impl<'de> Deserialize<'de> for RelayResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = Value::deserialize(deserializer)?;

        if let Some(result) = value.get("result").filter(|result| result.is_object()) {
            let result = BundleResult::deserialize(result).map_err(D::Error::custom)?;
            return Ok(RelayResponse::Success { result });
        }

        match value.as_object_mut().and_then(|body| body.remove("error")) {
            Some(error) => Ok(RelayResponse::Failure { error }),
            None => Ok(RelayResponse::Malformed(value)),
        }
    }
}

/// The `result` object of an `eth_sendBundle` / `eth_callBundle` response.
///
/// Fields are loosely typed because relays disagree on them; accessors in
/// the relay client decide what a usable value is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResult {
    #[serde(default)]
    pub bundle_hash: Option<Value>,
    #[serde(default)]
    pub total_gas_used: Option<Value>,
    /// Per-transaction outcomes; empty when absent or not an array
    #[serde(default, deserialize_with = "lenient_tx_results")]
    pub results: Vec<TxResult>,
}

/// Outcome of one bundle transaction
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResult {
    #[serde(default)]
    pub tx_hash: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub revert: Option<Value>,
}

impl TxResult {
    /// Whether the relay flagged this transaction as failed or reverted
    pub fn has_failure(&self) -> bool {
        self.error.is_some() || self.revert.is_some()
    }
}

/// Decode `results` entry by entry. Only objects are transaction results;
/// any other entry becomes an empty placeholder so positions still line up
fn lenient_tx_results<'de, D>(deserializer: D) -> Result<Vec<TxResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(_) => serde_json::from_value(entry).unwrap_or_default(),
            _ => TxResult::default(),
        })
        .collect())
}

/// Render a JSON value the way relays' messages read: strings verbatim,
/// everything else as compact JSON
pub fn value_to_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A single relay to talk to, with the identity used to sign requests
#[derive(Debug, Clone)]
pub struct RelayEndpoint {
    /// Unique name for the relay
    pub name: String,
    /// Endpoint bundles and stats requests are sent to
    pub main_endpoint: String,
    /// Endpoint used for `eth_callBundle`, if any
    pub simulation_endpoint: Option<String>,
    /// Key used to authenticate requests
    pub signing_key: PrivateKeySigner,
}

/// HTTP transport settings shared by relay clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    /// How long idle pooled connections are kept, in seconds
    #[serde(default = "default_pool_idle_timeout_seconds")]
    pub pool_idle_timeout_seconds: u64,
    /// Maximum idle connections kept per relay host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_connect_timeout_seconds() -> u64 {
    5
}

fn default_pool_idle_timeout_seconds() -> u64 {
    90
}

fn default_pool_max_idle_per_host() -> usize {
    8
}

fn default_user_agent() -> String {
    "bundle-relay/0.1.0".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            pool_idle_timeout_seconds: default_pool_idle_timeout_seconds(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
        }
    }
}
