//! Bundle-related types and structures

use alloy::{
    consensus::TxEnvelope,
    eips::eip2718::{Decodable2718, Encodable2718},
    hex,
    primitives::TxHash,
};
use serde::Serialize;

use crate::error::{BoxError, BundleError};
use crate::utils::{is_unset_state_block, state_block_param, to_hex_quantity, LATEST_BLOCK_TAG};

/// A signed transaction that can be carried inside a [`Bundle`]
pub trait BundleTransaction {
    /// Hash identifying the transaction
    fn hash(&self) -> TxHash;

    /// Canonical binary encoding, as relays expect it in `txs`
    fn encoded_bytes(&self) -> Result<Vec<u8>, BoxError>;
}

impl BundleTransaction for TxEnvelope {
    fn hash(&self) -> TxHash {
        *self.tx_hash()
    }

    fn encoded_bytes(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.encoded_2718())
    }
}

/// An ordered set of signed transactions submitted atomically to a relay.
///
/// `txs` always holds exactly one hex-encoded entry per transaction, in
/// the same order. The JSON form is the `eth_sendBundle` / `eth_callBundle`
/// parameter object; unset optional fields are omitted rather than `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = ""))]
pub struct Bundle<T = TxEnvelope> {
    #[serde(skip)]
    transactions: Vec<T>,
    /// Hex encoded transactions, `0x` prefixed
    txs: Vec<String>,
    /// Earliest block the bundle is valid for (hex)
    block_number: String,
    /// Block number or tag whose state a simulation is based on
    #[serde(skip_serializing_if = "String::is_empty")]
    state_block_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_timestamp: Option<u64>,
    /// Transactions that may revert without invalidating the bundle
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reverting_tx_hashes: Vec<String>,
}

impl<T: BundleTransaction> Bundle<T> {
    /// Create a bundle targeting `target_block`, simulated against `latest`
    pub fn new(transactions: Vec<T>, target_block: u64) -> Result<Self, BundleError> {
        let txs = transactions
            .iter()
            .map(encode_transaction)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transactions,
            txs,
            block_number: to_hex_quantity(target_block),
            state_block_number: LATEST_BLOCK_TAG.to_string(),
            min_timestamp: None,
            max_timestamp: None,
            reverting_tx_hashes: Vec::new(),
        })
    }

    /// Append a transaction to the end of the bundle.
    ///
    /// The bundle is left untouched if the transaction cannot be encoded.
    pub fn push_transaction(&mut self, tx: T) -> Result<(), BundleError> {
        let encoded = encode_transaction(&tx)?;
        self.transactions.push(tx);
        self.txs.push(encoded);
        Ok(())
    }
}

impl<T> Bundle<T> {
    /// Set the block whose state simulations run against, `0` meaning `latest`
    pub fn with_state_block(mut self, block: u64) -> Self {
        self.state_block_number = state_block_param(block);
        self
    }

    /// Set the earliest timestamp (inclusive) the bundle is valid for
    pub fn with_min_timestamp(mut self, timestamp: u64) -> Self {
        self.min_timestamp = Some(timestamp);
        self
    }

    /// Set the latest timestamp (inclusive) the bundle is valid for
    pub fn with_max_timestamp(mut self, timestamp: u64) -> Self {
        self.max_timestamp = Some(timestamp);
        self
    }

    /// Set the transactions that are allowed to revert, preserving order
    pub fn with_reverting_tx_hashes<I>(mut self, hashes: I) -> Self
    where
        I: IntoIterator<Item = TxHash>,
    {
        self.reverting_tx_hashes = hashes.into_iter().map(hex::encode_prefixed).collect();
        self
    }

    /// Replace an empty or zero state block with `latest`
    pub fn normalize_state_block(&mut self) {
        if is_unset_state_block(&self.state_block_number) {
            self.state_block_number = LATEST_BLOCK_TAG.to_string();
        }
    }

    pub fn transactions(&self) -> &[T] {
        &self.transactions
    }

    pub fn encoded_transactions(&self) -> &[String] {
        &self.txs
    }

    pub fn block_number(&self) -> &str {
        &self.block_number
    }

    pub fn state_block_number(&self) -> &str {
        &self.state_block_number
    }

    pub fn min_timestamp(&self) -> Option<u64> {
        self.min_timestamp
    }

    pub fn max_timestamp(&self) -> Option<u64> {
        self.max_timestamp
    }

    pub fn reverting_tx_hashes(&self) -> &[String] {
        &self.reverting_tx_hashes
    }

    /// Number of transactions in the bundle
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl Bundle<TxEnvelope> {
    /// Decode `txs` back into transaction envelopes
    pub fn decoded_transactions(&self) -> Result<Vec<TxEnvelope>, BoxError> {
        self.txs
            .iter()
            .map(|encoded| -> Result<TxEnvelope, BoxError> {
                let bytes = hex::decode(encoded)?;
                Ok(TxEnvelope::decode_2718(&mut bytes.as_slice())?)
            })
            .collect()
    }
}

fn encode_transaction<T: BundleTransaction>(tx: &T) -> Result<String, BundleError> {
    let bytes = tx.encoded_bytes().map_err(|source| BundleError::Encoding {
        tx_hash: hex::encode_prefixed(tx.hash()),
        source,
    })?;
    Ok(hex::encode_prefixed(bytes))
}
