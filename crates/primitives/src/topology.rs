//! Signer-tree topologies and their keccak256 hashing.
//!
//! [`Topology`] is the configuration-domain tree: every signer slot carries
//! an address and weight, and the tree hashes to a stable root used for the
//! configuration image hash. [`RawTopology`] is the signature-domain tree
//! produced by the leaf filler and the wire decoder: signer slots may carry
//! an unrecovered signature instead of a known address.

use alloy_primitives::{Address, B256, U256, keccak256};

use crate::signature::UnrecoveredSigner;

/// A plain-key signer and its voting weight.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignerLeaf {
    pub address: Address,
    pub weight: u64,
    /// Set by the recovery engine on leaves whose signature was recovered.
    /// Display-only: ignored by hashing and by the wire codec.
    pub signed: bool,
}

impl SignerLeaf {
    pub fn new(address: Address, weight: u64) -> Self {
        Self { address, weight, signed: false }
    }

    pub fn hash(&self) -> B256 {
        let mut buf = Vec::with_capacity(SIGNER_PREFIX.len() + 20 + 32);
        buf.extend_from_slice(SIGNER_PREFIX);
        buf.extend_from_slice(self.address.as_slice());
        buf.extend_from_slice(&U256::from(self.weight).to_be_bytes::<32>());
        keccak256(&buf)
    }
}

/// A contract-based signer whose validity also depends on a fixed
/// configuration hash of its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SapientSignerLeaf {
    pub address: Address,
    pub weight: u64,
    pub image_hash: B256,
    /// See [`SignerLeaf::signed`].
    pub signed: bool,
}

impl SapientSignerLeaf {
    pub fn new(address: Address, weight: u64, image_hash: B256) -> Self {
        Self { address, weight, image_hash, signed: false }
    }

    pub fn hash(&self) -> B256 {
        let mut buf = Vec::with_capacity(SAPIENT_PREFIX.len() + 20 + 32 + 32);
        buf.extend_from_slice(SAPIENT_PREFIX);
        buf.extend_from_slice(self.address.as_slice());
        buf.extend_from_slice(&U256::from(self.weight).to_be_bytes::<32>());
        buf.extend_from_slice(self.image_hash.as_slice());
        keccak256(&buf)
    }
}

/// A pre-approved digest. Grants maximum weight iff it equals the exact
/// digest being authorized for this wallet, chain, and payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubdigestLeaf {
    pub digest: B256,
}

impl SubdigestLeaf {
    pub fn hash(&self) -> B256 {
        keccak256([SUBDIGEST_PREFIX, self.digest.as_slice()].concat())
    }
}

/// Like [`SubdigestLeaf`], but the digest is computed with the zero address
/// in place of the wallet, so the same leaf authorizes the action for any
/// wallet sharing the configuration shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnyAddressSubdigestLeaf {
    pub digest: B256,
}

impl AnyAddressSubdigestLeaf {
    pub fn hash(&self) -> B256 {
        keccak256([ANY_ADDRESS_SUBDIGEST_PREFIX, self.digest.as_slice()].concat())
    }
}

/// An opaque reference to a pruned subtree. Contributes zero weight while
/// preserving the subtree's contribution to the parent hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeLeaf {
    pub hash: B256,
}

/// A sub-topology with its own threshold, gating a fixed outer weight.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NestedLeaf {
    pub weight: u64,
    pub threshold: u64,
    pub tree: Box<Topology>,
}

impl NestedLeaf {
    pub fn hash(&self) -> B256 {
        nested_hash(self.weight, self.threshold, self.tree.hash())
    }
}

/// [`NestedLeaf`] in the signature domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawNestedLeaf {
    pub weight: u64,
    pub threshold: u64,
    pub tree: Box<RawTopology>,
}

const SIGNER_PREFIX: &[u8] = b"Quill signer:\n";
const SAPIENT_PREFIX: &[u8] = b"Quill sapient signer:\n";
const SUBDIGEST_PREFIX: &[u8] = b"Quill static digest:\n";
const ANY_ADDRESS_SUBDIGEST_PREFIX: &[u8] = b"Quill any address subdigest:\n";
const NESTED_PREFIX: &[u8] = b"Quill nested config:\n";

fn nested_hash(weight: u64, threshold: u64, tree: B256) -> B256 {
    let mut buf = Vec::with_capacity(NESTED_PREFIX.len() + 32 + 32 + 32);
    buf.extend_from_slice(NESTED_PREFIX);
    buf.extend_from_slice(&U256::from(weight).to_be_bytes::<32>());
    buf.extend_from_slice(&U256::from(threshold).to_be_bytes::<32>());
    buf.extend_from_slice(tree.as_slice());
    keccak256(&buf)
}

fn branch_hash(left: B256, right: B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}

/// The configuration-domain signer tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Signer(SignerLeaf),
    SapientSigner(SapientSignerLeaf),
    Subdigest(SubdigestLeaf),
    AnyAddressSubdigest(AnyAddressSubdigestLeaf),
    Node(NodeLeaf),
    Nested(NestedLeaf),
    Branch(Box<Topology>, Box<Topology>),
}

impl Topology {
    /// A plain signer leaf.
    pub fn signer(address: Address, weight: u64) -> Self {
        Self::Signer(SignerLeaf::new(address, weight))
    }

    /// A sapient signer leaf.
    pub fn sapient_signer(address: Address, weight: u64, image_hash: B256) -> Self {
        Self::SapientSigner(SapientSignerLeaf::new(address, weight, image_hash))
    }

    /// A pre-approved digest leaf.
    pub fn subdigest(digest: B256) -> Self {
        Self::Subdigest(SubdigestLeaf { digest })
    }

    /// A pre-approved digest leaf valid for any wallet address.
    pub fn any_address_subdigest(digest: B256) -> Self {
        Self::AnyAddressSubdigest(AnyAddressSubdigestLeaf { digest })
    }

    /// An opaque pruned-subtree leaf.
    pub fn node(hash: B256) -> Self {
        Self::Node(NodeLeaf { hash })
    }

    /// A nested sub-configuration gating `weight` behind `threshold`.
    pub fn nested(weight: u64, threshold: u64, tree: Topology) -> Self {
        Self::Nested(NestedLeaf { weight, threshold, tree: Box::new(tree) })
    }

    /// A two-child branch node.
    pub fn branch(left: Topology, right: Topology) -> Self {
        Self::Branch(Box::new(left), Box::new(right))
    }

    pub fn is_signer_leaf(&self) -> bool {
        matches!(self, Self::Signer(_))
    }

    pub fn is_sapient_signer_leaf(&self) -> bool {
        matches!(self, Self::SapientSigner(_))
    }

    pub fn is_subdigest_leaf(&self) -> bool {
        matches!(self, Self::Subdigest(_))
    }

    pub fn is_any_address_subdigest_leaf(&self) -> bool {
        matches!(self, Self::AnyAddressSubdigest(_))
    }

    pub fn is_node_leaf(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn is_nested_leaf(&self) -> bool {
        matches!(self, Self::Nested(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(..))
    }

    /// Deterministic hash of this node.
    ///
    /// Branches hash the pair of child hashes, nested leaves commit to
    /// their weight, threshold, and subtree hash, and an opaque node leaf
    /// is returned unchanged since it already is a hash.
    pub fn hash(&self) -> B256 {
        match self {
            Self::Signer(leaf) => leaf.hash(),
            Self::SapientSigner(leaf) => leaf.hash(),
            Self::Subdigest(leaf) => leaf.hash(),
            Self::AnyAddressSubdigest(leaf) => leaf.hash(),
            Self::Node(leaf) => leaf.hash,
            Self::Nested(leaf) => leaf.hash(),
            Self::Branch(left, right) => branch_hash(left.hash(), right.hash()),
        }
    }

    /// Collect the `(address, weight)` of every plain and sapient signer
    /// slot, in tree order.
    pub fn signers(&self) -> Vec<(Address, u64)> {
        let mut out = Vec::new();
        self.collect_signers(&mut out);
        out
    }

    fn collect_signers(&self, out: &mut Vec<(Address, u64)>) {
        match self {
            Self::Signer(leaf) => out.push((leaf.address, leaf.weight)),
            Self::SapientSigner(leaf) => out.push((leaf.address, leaf.weight)),
            Self::Subdigest(_) | Self::AnyAddressSubdigest(_) | Self::Node(_) => {}
            Self::Nested(leaf) => leaf.tree.collect_signers(out),
            Self::Branch(left, right) => {
                left.collect_signers(out);
                right.collect_signers(out);
            }
        }
    }

    /// Best-case aggregate weight if every signer signs.
    ///
    /// Subdigest leaves count as the maximum since a matching digest grants
    /// it; opaque nodes count zero; a nested leaf contributes its outer
    /// weight only if its subtree can reach the inner threshold.
    pub fn max_weight(&self) -> u64 {
        match self {
            Self::Signer(leaf) => leaf.weight,
            Self::SapientSigner(leaf) => leaf.weight,
            Self::Subdigest(_) | Self::AnyAddressSubdigest(_) => u64::MAX,
            Self::Node(_) => 0,
            Self::Nested(leaf) => {
                if leaf.tree.max_weight() >= leaf.threshold {
                    leaf.weight
                } else {
                    0
                }
            }
            Self::Branch(left, right) => left.max_weight().saturating_add(right.max_weight()),
        }
    }
}

/// The signature-domain signer tree: a [`Topology`] whose signer slots may
/// carry unrecovered signatures.
///
/// Produced by [`fill_leaves`](crate::signature::fill_leaves) on the signing
/// side and by the wire decoder on the verifying side; consumed by the
/// recovery engine, which turns it back into a [`Topology`] with recovered
/// addresses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawTopology {
    /// A signer slot without a signature. Still carries its address and
    /// weight so the verifier can reconstruct the parent hash; contributes
    /// zero weight.
    Unsigned(SignerLeaf),
    /// A sapient signer slot without a signature. Has no wire flag of its
    /// own and is pruned to an opaque node when encoded.
    UnsignedSapient(SapientSignerLeaf),
    /// A signer slot with an attached, not-yet-recovered signature.
    Signed(UnrecoveredSigner),
    Subdigest(SubdigestLeaf),
    AnyAddressSubdigest(AnyAddressSubdigestLeaf),
    Node(NodeLeaf),
    Nested(RawNestedLeaf),
    Branch(Box<RawTopology>, Box<RawTopology>),
}

impl RawTopology {
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(..))
    }
}

impl From<Topology> for RawTopology {
    /// The all-unsigned preview of a topology, encodable before any
    /// signature has been collected.
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::Signer(leaf) => Self::Unsigned(leaf),
            Topology::SapientSigner(leaf) => Self::UnsignedSapient(leaf),
            Topology::Subdigest(leaf) => Self::Subdigest(leaf),
            Topology::AnyAddressSubdigest(leaf) => Self::AnyAddressSubdigest(leaf),
            Topology::Node(leaf) => Self::Node(leaf),
            Topology::Nested(leaf) => Self::Nested(RawNestedLeaf {
                weight: leaf.weight,
                threshold: leaf.threshold,
                tree: Box::new(Self::from(*leaf.tree)),
            }),
            Topology::Branch(left, right) => {
                Self::Branch(Box::new(Self::from(*left)), Box::new(Self::from(*right)))
            }
        }
    }
}
