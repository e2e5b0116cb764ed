//! Bottom-up signature recovery and weight aggregation.

use alloy_primitives::{Address, B256, Bytes};
use alloy_sol_types::SolCall;
use futures::future::BoxFuture;
use quill_contracts::{
    ERC1271_MAGIC_VALUE, isValidSignatureCall, recoverSapientSignatureCall,
    recoverSapientSignatureCompactCall,
};
use quill_primitives::topology::{NestedLeaf, SapientSignerLeaf, SignerLeaf};
use quill_primitives::{
    Payload, RawSignature, RawTopology, SignatureKind, Topology, UnrecoveredSigner, WalletConfig,
    eth_sign_digest, signing_digest,
};
use tracing::{debug, trace};

use crate::validator::{NoCalls, ReadCall};

/// How contract-based signers are validated.
///
/// `Call` issues live read-only calls through the given capability.
/// `AssumeValid` grants contract weights without calling out, for previews
/// and tests. `AssumeInvalid` fails every contract leaf, for negative
/// tests. ECDSA recovery and subdigest comparison are pure and behave the
/// same in every mode.
#[derive(Clone, Copy, Debug)]
pub enum SignerValidation<C> {
    Call(C),
    AssumeValid,
    AssumeInvalid,
}

impl SignerValidation<NoCalls> {
    /// Assume-valid mode without a live capability.
    pub const fn assume_valid() -> Self {
        Self::AssumeValid
    }

    /// Assume-invalid mode without a live capability.
    pub const fn assume_invalid() -> Self {
        Self::AssumeInvalid
    }
}

/// Validation failures. Fatal for this `recover` call; the caller decides
/// whether to re-prompt or retry with a different signer.
#[derive(Debug, thiserror::Error)]
pub enum RecoverError {
    #[error("invalid signer {0}")]
    InvalidSigner(Address),
    #[error("unable to validate signer {0}")]
    UnableToValidateSigner(Address),
    #[error("invalid sapient signer {0}")]
    InvalidSapientSigner(Address),
    #[error("unable to validate sapient signer {0}")]
    UnableToValidateSapientSigner(Address),
    #[error("malformed ecdsa signature")]
    MalformedSignature(#[from] alloy_primitives::SignatureError),
}

/// Outcome of [`recover`]: the recovered configuration, the aggregate
/// authorizing weight at its root, and the recovered suffix links of a
/// chained signature, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recovered {
    pub configuration: WalletConfig,
    pub weight: u64,
    pub suffix: Vec<Recovered>,
}

impl Recovered {
    /// Whether the aggregate weight satisfies the configuration threshold.
    pub fn meets_threshold(&self) -> bool {
        self.weight >= self.configuration.threshold
    }
}

/// Recover every leaf signature in `signature` against the digest of
/// `(wallet, chain_id, payload)` and total the authorizing weight.
///
/// A signature flagged no-chain-id is recovered against chain id 0.
/// Suffix links of a chained signature are recovered independently, link
/// by link, against the same wallet and payload; cross-link authorization
/// is the verifier's concern and is not checked here.
pub async fn recover<C: ReadCall>(
    signature: &RawSignature,
    wallet: Address,
    chain_id: u64,
    payload: &Payload,
    validation: &SignerValidation<C>,
) -> Result<Recovered, RecoverError> {
    recover_link(signature, wallet, chain_id, payload, validation).await
}

fn recover_link<'a, C: ReadCall>(
    signature: &'a RawSignature,
    wallet: Address,
    chain_id: u64,
    payload: &'a Payload,
    validation: &'a SignerValidation<C>,
) -> BoxFuture<'a, Result<Recovered, RecoverError>> {
    Box::pin(async move {
        let effective_chain_id = if signature.no_chain_id { 0 } else { chain_id };
        let ctx = Ctx {
            digest: signing_digest(wallet, effective_chain_id, payload),
            any_address_digest: signing_digest(Address::ZERO, effective_chain_id, payload),
            payload,
            validation,
        };

        let config = &signature.configuration;
        let (topology, weight) = recover_tree(&config.topology, &ctx).await?;
        trace!(weight, threshold = config.threshold, "recovered configuration root");

        let mut suffix = Vec::with_capacity(signature.suffix.len());
        for link in &signature.suffix {
            suffix.push(recover_link(link, wallet, chain_id, payload, validation).await?);
        }

        Ok(Recovered {
            configuration: WalletConfig {
                threshold: config.threshold,
                checkpoint: config.checkpoint,
                topology,
                checkpointer: config.checkpointer,
            },
            weight,
            suffix,
        })
    })
}

struct Ctx<'a, C> {
    digest: B256,
    any_address_digest: B256,
    payload: &'a Payload,
    validation: &'a SignerValidation<C>,
}

fn recover_tree<'a, C: ReadCall>(
    node: &'a RawTopology,
    ctx: &'a Ctx<'a, C>,
) -> BoxFuture<'a, Result<(Topology, u64), RecoverError>> {
    Box::pin(async move {
        match node {
            // An unsigned slot marks where a signature could still be
            // collected; it contributes nothing but stays in the tree.
            RawTopology::Unsigned(leaf) => Ok((Topology::Signer(leaf.clone()), 0)),
            RawTopology::UnsignedSapient(leaf) => Ok((Topology::SapientSigner(leaf.clone()), 0)),
            RawTopology::Node(leaf) => Ok((Topology::Node(leaf.clone()), 0)),
            RawTopology::Subdigest(leaf) => {
                let weight = if leaf.digest == ctx.digest { u64::MAX } else { 0 };
                Ok((Topology::Subdigest(leaf.clone()), weight))
            }
            RawTopology::AnyAddressSubdigest(leaf) => {
                let weight = if leaf.digest == ctx.any_address_digest { u64::MAX } else { 0 };
                Ok((Topology::AnyAddressSubdigest(leaf.clone()), weight))
            }
            RawTopology::Nested(leaf) => {
                let (tree, inner_weight) = recover_tree(&leaf.tree, ctx).await?;
                let weight = if inner_weight >= leaf.threshold { leaf.weight } else { 0 };
                Ok((
                    Topology::Nested(NestedLeaf {
                        weight: leaf.weight,
                        threshold: leaf.threshold,
                        tree: Box::new(tree),
                    }),
                    weight,
                ))
            }
            RawTopology::Branch(left, right) => {
                let (left_tree, left_weight) = recover_tree(left, ctx).await?;
                let (right_tree, right_weight) = recover_tree(right, ctx).await?;
                Ok((
                    Topology::Branch(Box::new(left_tree), Box::new(right_tree)),
                    left_weight.saturating_add(right_weight),
                ))
            }
            RawTopology::Signed(signer) => recover_signed(signer, ctx).await,
        }
    })
}

async fn recover_signed<C: ReadCall>(
    signer: &UnrecoveredSigner,
    ctx: &Ctx<'_, C>,
) -> Result<(Topology, u64), RecoverError> {
    let weight = signer.weight;
    match &signer.signature {
        SignatureKind::Hash(signature) => {
            let address = signature.recover_address_from_prehash(&ctx.digest)?;
            Ok((signed_leaf(address, weight), weight))
        }
        SignatureKind::EthSign(signature) => {
            let address = signature.recover_address_from_prehash(&eth_sign_digest(ctx.digest))?;
            Ok((signed_leaf(address, weight), weight))
        }
        SignatureKind::Erc1271 { address, data } => {
            validate_erc1271(*address, data, ctx).await?;
            Ok((signed_leaf(*address, weight), weight))
        }
        SignatureKind::Sapient { address, data } => {
            let image_hash = recover_sapient(*address, data, false, ctx).await?;
            Ok((sapient_leaf(*address, weight, image_hash), weight))
        }
        SignatureKind::SapientCompact { address, data } => {
            let image_hash = recover_sapient(*address, data, true, ctx).await?;
            Ok((sapient_leaf(*address, weight, image_hash), weight))
        }
    }
}

fn signed_leaf(address: Address, weight: u64) -> Topology {
    Topology::Signer(SignerLeaf { address, weight, signed: true })
}

fn sapient_leaf(address: Address, weight: u64, image_hash: B256) -> Topology {
    Topology::SapientSigner(SapientSignerLeaf { address, weight, image_hash, signed: true })
}

async fn validate_erc1271<C: ReadCall>(
    address: Address,
    data: &Bytes,
    ctx: &Ctx<'_, C>,
) -> Result<(), RecoverError> {
    let caller = match ctx.validation {
        SignerValidation::AssumeValid => return Ok(()),
        SignerValidation::AssumeInvalid => {
            return Err(RecoverError::UnableToValidateSigner(address));
        }
        SignerValidation::Call(caller) => caller,
    };

    let calldata = isValidSignatureCall { hash: ctx.digest, signature: data.clone() }.abi_encode();
    trace!(signer = %address, "validating contract signature");
    let returned = caller.call(address, calldata.into()).await.map_err(|error| {
        debug!(signer = %address, %error, "contract signature validation call failed");
        RecoverError::InvalidSigner(address)
    })?;
    let magic = isValidSignatureCall::abi_decode_returns(&returned).map_err(|error| {
        debug!(signer = %address, %error, "undecodable magic value");
        RecoverError::InvalidSigner(address)
    })?;
    if magic.0 == ERC1271_MAGIC_VALUE {
        Ok(())
    } else {
        debug!(signer = %address, %magic, "contract rejected the signature");
        Err(RecoverError::InvalidSigner(address))
    }
}

async fn recover_sapient<C: ReadCall>(
    address: Address,
    data: &Bytes,
    compact: bool,
    ctx: &Ctx<'_, C>,
) -> Result<B256, RecoverError> {
    let caller = match ctx.validation {
        // Without a capability there is nothing to recover; the zero image
        // hash marks the leaf as unverified.
        SignerValidation::AssumeValid => return Ok(B256::ZERO),
        SignerValidation::AssumeInvalid => {
            return Err(RecoverError::UnableToValidateSapientSigner(address));
        }
        SignerValidation::Call(caller) => caller,
    };

    let calldata = if compact {
        recoverSapientSignatureCompactCall { digest: ctx.digest, signature: data.clone() }
            .abi_encode()
    } else {
        recoverSapientSignatureCall {
            payload: ctx.payload.data.clone(),
            signature: data.clone(),
        }
        .abi_encode()
    };
    trace!(signer = %address, compact, "recovering sapient signature");
    let returned = caller.call(address, calldata.into()).await.map_err(|error| {
        debug!(signer = %address, %error, "sapient recovery call failed");
        RecoverError::InvalidSapientSigner(address)
    })?;
    let image_hash = if compact {
        recoverSapientSignatureCompactCall::abi_decode_returns(&returned)
    } else {
        recoverSapientSignatureCall::abi_decode_returns(&returned)
    }
    .map_err(|error| {
        debug!(signer = %address, %error, "undecodable sapient image hash");
        RecoverError::InvalidSapientSigner(address)
    })?;
    Ok(image_hash)
}
