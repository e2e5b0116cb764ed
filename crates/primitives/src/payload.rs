//! Signing digests for wallet payloads.
//!
//! The engine never interprets the payload it authorizes; it commits to the
//! payload's keccak256 under a `0x19 0x01` domain built from the wallet
//! address and chain id. Pre-approved "any address" digests substitute the
//! zero address so one approval covers every wallet sharing the
//! configuration shape.

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};

/// Opaque content being authorized.
///
/// Sapient signers receive the full bytes; everything else works from the
/// digest.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Payload {
    pub data: Bytes,
}

impl Payload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// keccak256 of the payload bytes.
    pub fn digest(&self) -> B256 {
        keccak256(&self.data)
    }
}

/// Digest a wallet signs to authorize `payload` on `chain_id`.
///
/// `0x19 0x01 ‖ chain id (32 bytes) ‖ wallet ‖ payload digest`. Signatures
/// flagged no-chain-id use chain id 0 here.
pub fn signing_digest(wallet: Address, chain_id: u64, payload: &Payload) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 20 + 32);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(wallet.as_slice());
    buf.extend_from_slice(payload.digest().as_slice());
    keccak256(&buf)
}

/// The standard personal-message prefix applied over a 32-byte digest
/// before eth_sign recovery.
pub fn eth_sign_digest(digest: B256) -> B256 {
    let mut buf = Vec::with_capacity(28 + 32);
    buf.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    buf.extend_from_slice(digest.as_slice());
    keccak256(&buf)
}
