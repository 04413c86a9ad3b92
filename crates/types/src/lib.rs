//! Shared types for the bundle relay client
//!
//! This crate contains the bundle model, the JSON-RPC wire types spoken with
//! relays, and the error taxonomy shared by the other workspace crates.

pub mod bundle;
pub mod error;
pub mod relay;
pub mod utils;

// Re-export commonly used types
pub use bundle::{Bundle, BundleTransaction};
pub use error::{BoxError, BundleError, ConfigError, ExecutionError, ResponseError};
pub use relay::{
    BundleResult, BundleStats, BundleStatsParams, BundleStatsResult, JsonRpcRequest, RelayEndpoint,
    RelayResponse, TransportConfig, TxResult,
};
