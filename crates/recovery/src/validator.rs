//! The read-only call capability injected into the engine.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;

/// Failure of the injected call capability. Carries whatever the backend
/// reported; the engine maps it to a validation error for the leaf that
/// triggered the call.
#[derive(Debug, thiserror::Error)]
#[error("read call failed: {0}")]
pub struct CallError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>);

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }

    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(error))
    }
}

/// A single read-only contract call: `call(to, data) -> bytes`.
///
/// Cancellation, retries, and timeouts are the implementor's business; the
/// engine issues each call exactly once.
#[async_trait]
pub trait ReadCall: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError>;
}

/// Capability for the assume-valid/assume-invalid validation modes, which
/// never reach the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCalls;

#[async_trait]
impl ReadCall for NoCalls {
    async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, CallError> {
        Err(CallError::new("read calls are disabled"))
    }
}

#[cfg(feature = "rpc")]
pub use rpc::ProviderReadCall;

#[cfg(feature = "rpc")]
mod rpc {
    use super::{CallError, ReadCall};
    use alloy_primitives::{Address, Bytes, TxKind};
    use alloy_provider::Provider;
    use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
    use async_trait::async_trait;

    /// [`ReadCall`] backed by an alloy provider via `eth_call`.
    #[derive(Clone, Debug)]
    pub struct ProviderReadCall<P> {
        provider: P,
    }

    impl<P> ProviderReadCall<P> {
        pub fn new(provider: P) -> Self {
            Self { provider }
        }
    }

    #[async_trait]
    impl<P: Provider + Send + Sync> ReadCall for ProviderReadCall<P> {
        async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
            let request = TransactionRequest {
                to: Some(TxKind::Call(to)),
                input: TransactionInput::new(data),
                ..Default::default()
            };
            self.provider.call(request).await.map_err(CallError::other)
        }
    }
}
