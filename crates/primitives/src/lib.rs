//! Primitive types for Quill weighted threshold signer trees.
//!
//! A wallet configuration is a recursive topology of weighted signers:
//! plain ECDSA keys, contract signers, pre-approved digests, pruned
//! subtrees, and nested sub-configurations with their own thresholds. This
//! crate holds the pure, synchronous core: the topology model and its
//! keccak256 tree hashing, payload signing digests, the binary wire codec
//! consumed by the on-chain verifier, the JSON bridge, and the leaf filler
//! that attaches signatures prior to encoding.
//!
//! Signature recovery and contract-signer validation live in
//! `quill-recovery`; contract ABI bindings live in `quill-contracts`.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod json;
pub mod payload;
pub mod signature;
pub mod topology;
pub mod wire;

pub use config::WalletConfig;
pub use json::JsonError;
pub use payload::{Payload, eth_sign_digest, signing_digest};
pub use signature::{
    RawSignature, RawWalletConfig, SignatureKind, UnrecoveredSigner, fill_leaves,
};
pub use topology::{
    AnyAddressSubdigestLeaf, NestedLeaf, NodeLeaf, RawNestedLeaf, RawTopology, SapientSignerLeaf,
    SignerLeaf, SubdigestLeaf, Topology,
};
pub use wire::{
    DecodeError, EncodeError, EncodeOptions, MAX_CHECKPOINT, MAX_THRESHOLD, MAX_WEIGHT,
    decode_signature, encode_signature,
};
