//! Request authentication for relays
//!
//! Relays identify the sender of a request by recovering an address from
//! the `X-Flashbots-Signature` header. The signature covers an EIP-191
//! personal message whose content is the hex keccak digest of the body, so
//! the signed message is always 66 ASCII characters long.

use alloy::{
    hex,
    primitives::{keccak256, Address, Signature, B256},
    signers::{local::PrivateKeySigner, SignerSync},
};

/// Header carrying `<address>:<signature>`
pub const SIGNATURE_HEADER: &str = "X-Flashbots-Signature";

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Signing identity used to authenticate requests to relays
#[derive(Debug, Clone)]
pub struct RelaySigner {
    inner: PrivateKeySigner,
    /// Cached address of the signing key
    address: Address,
}

impl RelaySigner {
    pub fn new(inner: PrivateKeySigner) -> Self {
        let address = inner.address();
        Self { inner, address }
    }

    /// Creates a signer with a freshly generated key
    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a request body, returning the `0x`-prefixed 65 byte signature
    pub fn sign_payload(&self, payload: &[u8]) -> alloy::signers::Result<String> {
        let signature = self.sign_message(&payload_message_hash(payload))?;
        Ok(hex::encode_prefixed(signature_bytes(&signature)))
    }

    /// Header value for a request body: checksummed address, a colon, then the signature
    pub fn signature_header(&self, payload: &[u8]) -> alloy::signers::Result<String> {
        let signature = self.sign_payload(payload)?;
        Ok(format!("{}:{}", self.address.to_checksum(None), signature))
    }

    fn sign_message(&self, message: &B256) -> alloy::signers::Result<Signature> {
        self.inner.sign_hash_sync(message)
    }
}

impl From<PrivateKeySigner> for RelaySigner {
    fn from(inner: PrivateKeySigner) -> Self {
        Self::new(inner)
    }
}

/// Hash that gets signed for a request body.
///
/// `keccak256("\x19Ethereum Signed Message:\n" + len(hex) + hex)` where
/// `hex` is the `0x`-prefixed lowercase keccak digest of the body.
pub fn payload_message_hash(payload: &[u8]) -> B256 {
    let digest = hex::encode_prefixed(keccak256(payload));
    let length = digest.len().to_string();

    let mut message =
        Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + length.len() + digest.len());
    message.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    message.extend_from_slice(length.as_bytes());
    message.extend_from_slice(digest.as_bytes());

    keccak256(&message)
}

/// `r || s || v` with `v` as the raw recovery id (0 or 1)
fn signature_bytes(signature: &Signature) -> [u8; 65] {
    let mut bytes = [0u8; 65];
    bytes[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
    bytes[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
    bytes[64] = signature.v().y_parity_byte();
    bytes
}
