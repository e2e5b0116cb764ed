//! Raw (unrecovered) signatures and the leaf filler.
//!
//! A [`RawSignature`] is the decoded form of the wire format: a
//! configuration whose topology may carry unrecovered leaf signatures,
//! plus the top-level flags and the optional chain of follow-on signatures
//! used for configuration updates. [`fill_leaves`] builds the signature
//! side: it walks a configuration topology and attaches whatever
//! signatures a provider can produce.

use alloy_primitives::{Address, Bytes, Signature};

use crate::topology::{RawNestedLeaf, RawTopology, Topology};
use crate::wire::{self, DecodeError, EncodeError, EncodeOptions};

/// One leaf signature, prior to recovery.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// ECDSA over the signing digest.
    Hash(Signature),
    /// ECDSA over the personal-message-prefixed signing digest.
    EthSign(Signature),
    /// ERC-1271 contract validation of the signing digest.
    Erc1271 { address: Address, data: Bytes },
    /// Sapient contract recovery over the full payload.
    Sapient { address: Address, data: Bytes },
    /// Sapient contract recovery over the signing digest only.
    SapientCompact { address: Address, data: Bytes },
}

/// A signer slot with an attached, not-yet-recovered signature.
///
/// ECDSA kinds carry no address; recovery derives it from the signature.
/// Contract kinds name the contract inside the [`SignatureKind`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnrecoveredSigner {
    pub weight: u64,
    pub signature: SignatureKind,
}

/// [`WalletConfig`](crate::WalletConfig) in the signature domain: the
/// topology may carry unrecovered signatures.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawWalletConfig {
    pub threshold: u64,
    pub checkpoint: u64,
    pub topology: RawTopology,
    pub checkpointer: Option<Address>,
}

/// A complete decoded signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawSignature {
    /// The signing digest was computed with chain id 0, making the
    /// signature valid on any chain.
    pub no_chain_id: bool,
    /// Opaque payload for the configuration's checkpointer, if any.
    pub checkpointer_data: Option<Bytes>,
    pub configuration: RawWalletConfig,
    /// Follow-on signatures for configuration updates, in order.
    pub suffix: Vec<RawSignature>,
}

impl RawSignature {
    /// A plain, unchained signature over one configuration.
    pub fn new(configuration: RawWalletConfig) -> Self {
        Self { no_chain_id: false, checkpointer_data: None, configuration, suffix: Vec::new() }
    }

    /// Encode into the wire format.
    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        wire::encode_signature(self, EncodeOptions::default())
    }

    /// Encode with checkpointer fields optionally omitted, for
    /// partial/unsigned previews.
    pub fn encode_with(&self, options: EncodeOptions) -> Result<Bytes, EncodeError> {
        wire::encode_signature(self, options)
    }

    /// Decode from the wire format. The buffer must be consumed exactly.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        wire::decode_signature(bytes)
    }
}

/// Walk `topology` and attach a signature to every signer leaf the
/// provider can sign for, producing the signature-domain tree.
///
/// The provider is consulted for plain and sapient signer leaves only and
/// sees the leaf it is being asked to sign; returning `None` leaves the
/// slot unsigned. Subdigest and node leaves are never signable and pass
/// through unchanged. The input is not mutated.
pub fn fill_leaves<P>(topology: &Topology, provider: &mut P) -> RawTopology
where
    P: FnMut(&Topology) -> Option<SignatureKind>,
{
    match topology {
        Topology::Signer(leaf) => match provider(topology) {
            Some(signature) => {
                RawTopology::Signed(UnrecoveredSigner { weight: leaf.weight, signature })
            }
            None => RawTopology::Unsigned(leaf.clone()),
        },
        Topology::SapientSigner(leaf) => match provider(topology) {
            Some(signature) => {
                RawTopology::Signed(UnrecoveredSigner { weight: leaf.weight, signature })
            }
            None => RawTopology::UnsignedSapient(leaf.clone()),
        },
        Topology::Subdigest(leaf) => RawTopology::Subdigest(leaf.clone()),
        Topology::AnyAddressSubdigest(leaf) => RawTopology::AnyAddressSubdigest(leaf.clone()),
        Topology::Node(leaf) => RawTopology::Node(leaf.clone()),
        Topology::Nested(leaf) => RawTopology::Nested(RawNestedLeaf {
            weight: leaf.weight,
            threshold: leaf.threshold,
            tree: Box::new(fill_leaves(&leaf.tree, provider)),
        }),
        Topology::Branch(left, right) => RawTopology::Branch(
            Box::new(fill_leaves(left, provider)),
            Box::new(fill_leaves(right, provider)),
        ),
    }
}
