//! Recovery and validation engine for Quill signer trees.
//!
//! [`recover`] walks a decoded [`RawSignature`](quill_primitives::RawSignature)
//! bottom-up: ECDSA leaves recover their signer address from the signing
//! digest, contract leaves validate through an injected read-only call
//! capability, subdigest leaves compare against the exact digest being
//! authorized, and nested thresholds gate outer weights. The result is the
//! recovered [`WalletConfig`](quill_primitives::WalletConfig) and the total
//! authorizing weight, which callers compare against the configuration
//! threshold (and whose image hash they compare against the wallet's
//! on-chain image hash).
//!
//! The engine performs no retries and owns no timeouts; the injected
//! [`ReadCall`] capability decides both, and any capability failure is
//! terminal for the whole recovery.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod engine;
mod validator;

pub use engine::{Recovered, RecoverError, SignerValidation, recover};
pub use validator::{CallError, NoCalls, ReadCall};

#[cfg(feature = "rpc")]
pub use validator::ProviderReadCall;
