//! Relay client for communicating with MEV bundle relays
//!
//! This crate signs and sends `eth_sendBundle`, `eth_callBundle` and
//! `flashbots_getBundleStats` requests, fans bundles out to several relays,
//! and interprets the response shapes relays send back.

pub mod batch;
pub mod client;
pub mod error;
pub mod response;
pub mod signer;

pub use batch::{BatchRelayClient, BatchResults};
pub use client::{build_http_client, RelayClient, RelayReply};
pub use error::RelayError;
pub use response::{extract_bundle_hash, extract_execution_errors, extract_gas_used, parse_response};
pub use signer::{payload_message_hash, RelaySigner, SIGNATURE_HEADER};
