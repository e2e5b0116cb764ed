//! Binary wire format for signatures.
//!
//! The format is consumed by the on-chain verifier and must round-trip
//! exactly. A topology is encoded as a flat sequence of nodes folded
//! left-associatively into branches; every node starts with a header byte
//! `(flag << 4) | weight nibble`, where a zero nibble means the full weight
//! follows in one explicit byte. All variable-length regions (contract
//! signature data, checkpointer data, branch and nested subtree bodies,
//! chained links) are delimited by 3-byte big-endian length prefixes.
//!
//! Layout of a complete signature:
//!
//! ```text
//! control byte   bit 0 chained, bit 1 no-chain-id,
//!                bit 2 checkpointer address, bit 3 checkpointer data
//! threshold      3 bytes BE (< 2^20)
//! checkpoint     8 bytes BE (< 2^60)
//! checkpointer   20 bytes, if present
//! cp. data       3-byte length + bytes, if present
//! topology       rest of buffer; when chained, 3-byte length + bytes,
//!                then per link: 3-byte length + full signature encoding
//! ```

use alloy_primitives::{Address, B256, Bytes, Signature, U256};

use crate::signature::{RawSignature, RawWalletConfig, SignatureKind, UnrecoveredSigner};
use crate::topology::{
    AnyAddressSubdigestLeaf, NodeLeaf, RawNestedLeaf, RawTopology, SignerLeaf, SubdigestLeaf,
};

/// ECDSA signature over the signing digest.
pub const FLAG_SIGNATURE_HASH: u8 = 0;
/// Unsigned signer slot: address and weight only.
pub const FLAG_ADDRESS: u8 = 1;
/// ERC-1271 contract signature.
pub const FLAG_SIGNATURE_ERC1271: u8 = 2;
/// Opaque pruned-subtree hash.
pub const FLAG_NODE: u8 = 3;
/// Explicitly sized branch subtree.
pub const FLAG_BRANCH: u8 = 4;
/// Pre-approved digest.
pub const FLAG_SUBDIGEST: u8 = 5;
/// Nested sub-configuration.
pub const FLAG_NESTED: u8 = 6;
/// ECDSA signature over the personal-message-prefixed digest.
pub const FLAG_SIGNATURE_ETH_SIGN: u8 = 7;
/// Pre-approved digest valid for any wallet address.
pub const FLAG_ANY_ADDRESS_SUBDIGEST: u8 = 8;
/// Sapient contract signature over the full payload.
pub const FLAG_SIGNATURE_SAPIENT: u8 = 9;
/// Sapient contract signature over the digest only.
pub const FLAG_SIGNATURE_SAPIENT_COMPACT: u8 = 10;

const CONTROL_CHAINED: u8 = 0x01;
const CONTROL_NO_CHAIN_ID: u8 = 0x02;
const CONTROL_CHECKPOINTER: u8 = 0x04;
const CONTROL_CHECKPOINTER_DATA: u8 = 0x08;

/// Largest weight the wire format can carry.
pub const MAX_WEIGHT: u64 = 0xff;
/// Largest threshold the verifier accepts.
pub const MAX_THRESHOLD: u64 = (1 << 20) - 1;
/// Largest checkpoint the verifier accepts.
pub const MAX_CHECKPOINT: u64 = (1 << 60) - 1;

const MAX_U24: usize = 0xff_ff_ff;

/// Encode-time failures. All of these indicate a caller-side bug rather
/// than bad input data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("signer weight {0} exceeds 255")]
    WeightTooLarge(u64),
    #[error("threshold {0} exceeds 2^20 - 1")]
    ThresholdTooLarge(u64),
    #[error("checkpoint {0} exceeds 2^60 - 1")]
    CheckpointTooLarge(u64),
    #[error("checkpointer data of {0} bytes exceeds the 3-byte length field")]
    CheckpointerDataTooLarge(usize),
    #[error("signature data of {0} bytes exceeds the 3-byte length field")]
    SignatureDataTooLarge(usize),
    #[error("encoded subtree of {0} bytes exceeds the 3-byte length field")]
    SubtreeTooLarge(usize),
}

/// Decode-time failures. The payload is corrupt or produced by an
/// incompatible encoder; none of these are retryable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty signature")]
    EmptySignature,
    #[error("not enough bytes: need {needed}, have {available}")]
    NotEnoughBytes { needed: usize, available: usize },
    #[error("unknown topology flag {0}")]
    UnknownFlag(u8),
    #[error("{0} leftover bytes after decoding")]
    LeftoverBytes(usize),
    #[error("branch with no nodes")]
    EmptyBranch,
}

/// Checkpointer fields can be dropped from the encoding when building
/// partial or unsigned previews.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub omit_checkpointer: bool,
    pub omit_checkpointer_data: bool,
}

/// Encode a complete signature into the wire format.
pub fn encode_signature(
    signature: &RawSignature,
    options: EncodeOptions,
) -> Result<Bytes, EncodeError> {
    let config = &signature.configuration;
    if config.threshold > MAX_THRESHOLD {
        return Err(EncodeError::ThresholdTooLarge(config.threshold));
    }
    if config.checkpoint > MAX_CHECKPOINT {
        return Err(EncodeError::CheckpointTooLarge(config.checkpoint));
    }

    let chained = !signature.suffix.is_empty();
    let checkpointer = config.checkpointer.filter(|_| !options.omit_checkpointer);
    let checkpointer_data =
        signature.checkpointer_data.as_ref().filter(|_| !options.omit_checkpointer_data);

    let mut control = 0u8;
    if chained {
        control |= CONTROL_CHAINED;
    }
    if signature.no_chain_id {
        control |= CONTROL_NO_CHAIN_ID;
    }
    if checkpointer.is_some() {
        control |= CONTROL_CHECKPOINTER;
    }
    if checkpointer_data.is_some() {
        control |= CONTROL_CHECKPOINTER_DATA;
    }

    let mut out = Vec::new();
    out.push(control);
    out.extend_from_slice(&(config.threshold as u32).to_be_bytes()[1..]);
    out.extend_from_slice(&config.checkpoint.to_be_bytes());
    if let Some(address) = checkpointer {
        out.extend_from_slice(address.as_slice());
    }
    if let Some(data) = checkpointer_data {
        if data.len() > MAX_U24 {
            return Err(EncodeError::CheckpointerDataTooLarge(data.len()));
        }
        push_u24(&mut out, data.len());
        out.extend_from_slice(data);
    }

    let topology = encode_topology(&config.topology)?;
    if chained {
        push_sized(&mut out, &topology)?;
        for link in &signature.suffix {
            let encoded = encode_signature(link, EncodeOptions::default())?;
            push_sized(&mut out, &encoded)?;
        }
    } else {
        out.extend_from_slice(&topology);
    }
    Ok(out.into())
}

/// Encode a topology as its flat node sequence.
pub fn encode_topology(topology: &RawTopology) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_node(topology, &mut out)?;
    Ok(out)
}

fn encode_node(node: &RawTopology, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match node {
        RawTopology::Unsigned(leaf) => {
            push_header(out, FLAG_ADDRESS, leaf.weight)?;
            out.extend_from_slice(leaf.address.as_slice());
        }
        RawTopology::UnsignedSapient(leaf) => {
            // No flag exists for an unsigned sapient slot; prune it to an
            // opaque node carrying the leaf hash. Weight contribution is
            // zero either way and the parent hash is preserved.
            out.push(FLAG_NODE << 4);
            out.extend_from_slice(leaf.hash().as_slice());
        }
        RawTopology::Signed(signer) => encode_signed(signer, out)?,
        RawTopology::Subdigest(leaf) => {
            out.push(FLAG_SUBDIGEST << 4);
            out.extend_from_slice(leaf.digest.as_slice());
        }
        RawTopology::AnyAddressSubdigest(leaf) => {
            out.push(FLAG_ANY_ADDRESS_SUBDIGEST << 4);
            out.extend_from_slice(leaf.digest.as_slice());
        }
        RawTopology::Node(leaf) => {
            out.push(FLAG_NODE << 4);
            out.extend_from_slice(leaf.hash.as_slice());
        }
        RawTopology::Nested(leaf) => {
            if leaf.threshold > MAX_THRESHOLD {
                return Err(EncodeError::ThresholdTooLarge(leaf.threshold));
            }
            push_header(out, FLAG_NESTED, leaf.weight)?;
            push_u24(out, leaf.threshold as usize);
            let body = encode_topology(&leaf.tree)?;
            push_sized(out, &body)?;
        }
        RawTopology::Branch(left, right) => {
            encode_node(left, out)?;
            if right.is_branch() {
                // A branching right child needs an explicit size so the
                // decoder knows where its node sequence ends.
                let body = encode_topology(right)?;
                out.push(FLAG_BRANCH << 4);
                push_sized(out, &body)?;
            } else {
                encode_node(right, out)?;
            }
        }
    }
    Ok(())
}

fn encode_signed(signer: &UnrecoveredSigner, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match &signer.signature {
        SignatureKind::Hash(signature) => {
            push_header(out, FLAG_SIGNATURE_HASH, signer.weight)?;
            out.extend_from_slice(&pack_erc2098(signature));
        }
        SignatureKind::EthSign(signature) => {
            push_header(out, FLAG_SIGNATURE_ETH_SIGN, signer.weight)?;
            out.extend_from_slice(&pack_erc2098(signature));
        }
        SignatureKind::Erc1271 { address, data } => {
            encode_contract_signature(out, FLAG_SIGNATURE_ERC1271, signer.weight, *address, data)?;
        }
        SignatureKind::Sapient { address, data } => {
            encode_contract_signature(out, FLAG_SIGNATURE_SAPIENT, signer.weight, *address, data)?;
        }
        SignatureKind::SapientCompact { address, data } => {
            encode_contract_signature(
                out,
                FLAG_SIGNATURE_SAPIENT_COMPACT,
                signer.weight,
                *address,
                data,
            )?;
        }
    }
    Ok(())
}

fn encode_contract_signature(
    out: &mut Vec<u8>,
    flag: u8,
    weight: u64,
    address: Address,
    data: &[u8],
) -> Result<(), EncodeError> {
    if data.len() > MAX_U24 {
        return Err(EncodeError::SignatureDataTooLarge(data.len()));
    }
    push_header(out, flag, weight)?;
    out.extend_from_slice(address.as_slice());
    push_u24(out, data.len());
    out.extend_from_slice(data);
    Ok(())
}

/// Weights 1-15 ride in the header nibble; weight 0 and 16-255 set the
/// nibble to zero and follow in one explicit byte, since a zero nibble
/// unconditionally means "read the next byte" on the decode side.
fn push_header(out: &mut Vec<u8>, flag: u8, weight: u64) -> Result<(), EncodeError> {
    if weight > MAX_WEIGHT {
        return Err(EncodeError::WeightTooLarge(weight));
    }
    if (1..=15).contains(&weight) {
        out.push(flag << 4 | weight as u8);
    } else {
        out.push(flag << 4);
        out.push(weight as u8);
    }
    Ok(())
}

fn push_u24(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&[(value >> 16) as u8, (value >> 8) as u8, value as u8]);
}

fn push_sized(out: &mut Vec<u8>, body: &[u8]) -> Result<(), EncodeError> {
    if body.len() > MAX_U24 {
        return Err(EncodeError::SubtreeTooLarge(body.len()));
    }
    push_u24(out, body.len());
    out.extend_from_slice(body);
    Ok(())
}

fn pack_erc2098(signature: &Signature) -> [u8; 64] {
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
    out[32..].copy_from_slice(&signature.s().to_be_bytes::<32>());
    if signature.v() {
        out[32] |= 0x80;
    }
    out
}

fn unpack_erc2098(bytes: &[u8]) -> Signature {
    let r = U256::from_be_slice(&bytes[..32]);
    let mut s = [0u8; 32];
    s.copy_from_slice(&bytes[32..64]);
    let y_parity = s[0] & 0x80 != 0;
    s[0] &= 0x7f;
    Signature::new(r, U256::from_be_bytes(s), y_parity)
}

/// Decode a complete signature. The buffer must be consumed exactly.
pub fn decode_signature(bytes: &[u8]) -> Result<RawSignature, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptySignature);
    }
    let mut reader = Reader::new(bytes);
    let control = reader.take_u8()?;
    let chained = control & CONTROL_CHAINED != 0;
    let no_chain_id = control & CONTROL_NO_CHAIN_ID != 0;

    let threshold = reader.take_u24()? as u64;
    let checkpoint = reader.take_u64()?;
    let checkpointer = if control & CONTROL_CHECKPOINTER != 0 {
        Some(reader.take_address()?)
    } else {
        None
    };
    let checkpointer_data = if control & CONTROL_CHECKPOINTER_DATA != 0 {
        let len = reader.take_u24()?;
        Some(Bytes::copy_from_slice(reader.take(len)?))
    } else {
        None
    };

    let (topology, suffix) = if chained {
        let len = reader.take_u24()?;
        let topology = decode_topology(reader.take(len)?)?;
        let mut suffix = Vec::new();
        while !reader.is_empty() {
            let len = reader.take_u24()?;
            suffix.push(decode_signature(reader.take(len)?)?);
        }
        (topology, suffix)
    } else {
        (decode_topology(reader.rest())?, Vec::new())
    };

    Ok(RawSignature {
        no_chain_id,
        checkpointer_data,
        configuration: RawWalletConfig { threshold, checkpoint, topology, checkpointer },
        suffix,
    })
}

/// Parse a complete topology from a buffer that must hold exactly its flat
/// node sequence.
pub fn decode_topology(bytes: &[u8]) -> Result<RawTopology, DecodeError> {
    let (nodes, leftover) = parse_branch(bytes)?;
    if !leftover.is_empty() {
        return Err(DecodeError::LeftoverBytes(leftover.len()));
    }
    fold_nodes(nodes)
}

/// Consume sibling nodes from the front of a buffer, returning the parsed
/// nodes and whatever the parse did not consume.
pub fn parse_branch(bytes: &[u8]) -> Result<(Vec<RawTopology>, &[u8]), DecodeError> {
    let mut reader = Reader::new(bytes);
    let mut nodes = Vec::new();
    while !reader.is_empty() {
        nodes.push(decode_node(&mut reader)?);
    }
    Ok((nodes, reader.rest()))
}

/// A node sequence folds left-associatively: `[a, b, c]` is
/// `Branch(Branch(a, b), c)`.
fn fold_nodes(nodes: Vec<RawTopology>) -> Result<RawTopology, DecodeError> {
    let mut iter = nodes.into_iter();
    let first = iter.next().ok_or(DecodeError::EmptyBranch)?;
    Ok(iter.fold(first, |acc, node| RawTopology::Branch(Box::new(acc), Box::new(node))))
}

fn decode_node(reader: &mut Reader<'_>) -> Result<RawTopology, DecodeError> {
    let header = reader.take_u8()?;
    let flag = header >> 4;
    let nibble = header & 0x0f;
    match flag {
        FLAG_SIGNATURE_HASH => {
            let weight = read_weight(reader, nibble)?;
            let signature = unpack_erc2098(reader.take(64)?);
            Ok(RawTopology::Signed(UnrecoveredSigner {
                weight,
                signature: SignatureKind::Hash(signature),
            }))
        }
        FLAG_SIGNATURE_ETH_SIGN => {
            let weight = read_weight(reader, nibble)?;
            let signature = unpack_erc2098(reader.take(64)?);
            Ok(RawTopology::Signed(UnrecoveredSigner {
                weight,
                signature: SignatureKind::EthSign(signature),
            }))
        }
        FLAG_ADDRESS => {
            let weight = read_weight(reader, nibble)?;
            let address = reader.take_address()?;
            Ok(RawTopology::Unsigned(SignerLeaf { address, weight, signed: false }))
        }
        FLAG_SIGNATURE_ERC1271 => {
            let (weight, address, data) = decode_contract_signature(reader, nibble)?;
            Ok(RawTopology::Signed(UnrecoveredSigner {
                weight,
                signature: SignatureKind::Erc1271 { address, data },
            }))
        }
        FLAG_SIGNATURE_SAPIENT => {
            let (weight, address, data) = decode_contract_signature(reader, nibble)?;
            Ok(RawTopology::Signed(UnrecoveredSigner {
                weight,
                signature: SignatureKind::Sapient { address, data },
            }))
        }
        FLAG_SIGNATURE_SAPIENT_COMPACT => {
            let (weight, address, data) = decode_contract_signature(reader, nibble)?;
            Ok(RawTopology::Signed(UnrecoveredSigner {
                weight,
                signature: SignatureKind::SapientCompact { address, data },
            }))
        }
        FLAG_NODE => Ok(RawTopology::Node(NodeLeaf { hash: reader.take_b256()? })),
        FLAG_SUBDIGEST => {
            Ok(RawTopology::Subdigest(SubdigestLeaf { digest: reader.take_b256()? }))
        }
        FLAG_ANY_ADDRESS_SUBDIGEST => Ok(RawTopology::AnyAddressSubdigest(
            AnyAddressSubdigestLeaf { digest: reader.take_b256()? },
        )),
        FLAG_BRANCH => {
            let len = reader.take_u24()?;
            let (nodes, leftover) = parse_branch(reader.take(len)?)?;
            if !leftover.is_empty() {
                return Err(DecodeError::LeftoverBytes(leftover.len()));
            }
            fold_nodes(nodes)
        }
        FLAG_NESTED => {
            let weight = read_weight(reader, nibble)?;
            let threshold = reader.take_u24()? as u64;
            let len = reader.take_u24()?;
            let tree = decode_topology(reader.take(len)?)?;
            Ok(RawTopology::Nested(RawNestedLeaf { weight, threshold, tree: Box::new(tree) }))
        }
        flag => Err(DecodeError::UnknownFlag(flag)),
    }
}

fn decode_contract_signature(
    reader: &mut Reader<'_>,
    nibble: u8,
) -> Result<(u64, Address, Bytes), DecodeError> {
    let weight = read_weight(reader, nibble)?;
    let address = reader.take_address()?;
    let len = reader.take_u24()?;
    let data = Bytes::copy_from_slice(reader.take(len)?);
    Ok((weight, address, data))
}

fn read_weight(reader: &mut Reader<'_>, nibble: u8) -> Result<u64, DecodeError> {
    if nibble == 0 { Ok(reader.take_u8()? as u64) } else { Ok(nibble as u64) }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buf)
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], DecodeError> {
        if self.buf.len() < needed {
            return Err(DecodeError::NotEnoughBytes { needed, available: self.buf.len() });
        }
        let (head, rest) = self.buf.split_at(needed);
        self.buf = rest;
        Ok(head)
    }

    fn take_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn take_u24(&mut self) -> Result<usize, DecodeError> {
        let bytes = self.take(3)?;
        Ok((bytes[0] as usize) << 16 | (bytes[1] as usize) << 8 | bytes[2] as usize)
    }

    fn take_u64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    fn take_address(&mut self) -> Result<Address, DecodeError> {
        Ok(Address::from_slice(self.take(20)?))
    }

    fn take_b256(&mut self) -> Result<B256, DecodeError> {
        Ok(B256::from_slice(self.take(32)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::SapientSignerLeaf;
    use proptest::prelude::*;
    use test_case::test_case;

    fn unchained(topology: RawTopology) -> RawSignature {
        RawSignature::new(RawWalletConfig {
            threshold: 1,
            checkpoint: 0,
            topology,
            checkpointer: None,
        })
    }

    fn signer(weight: u64) -> RawTopology {
        RawTopology::Unsigned(SignerLeaf { address: Address::random(), weight, signed: false })
    }

    fn ecdsa(y_parity: bool) -> Signature {
        // Top bit of s stays clear so the compact packing is lossless, as
        // it is for any low-s signature.
        Signature::new(U256::from(7u64), U256::from(11u64), y_parity)
    }

    fn roundtrip(signature: &RawSignature) -> RawSignature {
        let encoded = encode_signature(signature, EncodeOptions::default()).expect("encode");
        decode_signature(&encoded).expect("decode")
    }

    #[test]
    fn signer_leaf_header_byte() {
        let address = Address::random();
        let signature = unchained(RawTopology::Unsigned(SignerLeaf {
            address,
            weight: 5,
            signed: false,
        }));
        let encoded = encode_signature(&signature, EncodeOptions::default()).unwrap();

        // control, threshold (3), checkpoint (8), then the topology.
        assert_eq!(encoded[0], 0x00);
        assert_eq!(&encoded[1..4], &[0x00, 0x00, 0x01]);
        assert_eq!(&encoded[4..12], &[0u8; 8]);
        assert_eq!(encoded[12], (FLAG_ADDRESS << 4) | 5);
        assert_eq!(&encoded[13..33], address.as_slice());
        assert_eq!(encoded.len(), 33);

        assert_eq!(roundtrip(&signature), signature);
    }

    #[test_case(1, 21; "minimum inline weight")]
    #[test_case(15, 21; "maximum inline weight")]
    #[test_case(0, 22; "zero weight is dynamic")]
    #[test_case(16, 22; "first dynamic weight")]
    #[test_case(255, 22; "maximum weight")]
    fn signer_leaf_weight_encoding(weight: u64, expected_len: usize) {
        let node = signer(weight);
        let encoded = encode_topology(&node).unwrap();
        assert_eq!(encoded.len(), expected_len);
        assert_eq!(decode_topology(&encoded).unwrap(), node);
    }

    #[test]
    fn weight_256_fails() {
        assert_eq!(
            encode_topology(&signer(256)),
            Err(EncodeError::WeightTooLarge(256)),
        );
    }

    #[test]
    fn threshold_boundary() {
        let mut signature = unchained(signer(1));
        signature.configuration.threshold = MAX_THRESHOLD;
        assert_eq!(roundtrip(&signature), signature);

        signature.configuration.threshold = MAX_THRESHOLD + 1;
        assert_eq!(
            encode_signature(&signature, EncodeOptions::default()),
            Err(EncodeError::ThresholdTooLarge(1 << 20)),
        );
    }

    #[test]
    fn checkpoint_boundary() {
        let mut signature = unchained(signer(1));
        signature.configuration.checkpoint = MAX_CHECKPOINT;
        assert_eq!(roundtrip(&signature), signature);

        signature.configuration.checkpoint = MAX_CHECKPOINT + 1;
        assert_eq!(
            encode_signature(&signature, EncodeOptions::default()),
            Err(EncodeError::CheckpointTooLarge(1 << 60)),
        );
    }

    #[test]
    fn nested_threshold_boundary() {
        let nested = RawTopology::Nested(RawNestedLeaf {
            weight: 1,
            threshold: MAX_THRESHOLD,
            tree: Box::new(signer(1)),
        });
        let encoded = encode_topology(&nested).unwrap();
        assert_eq!(decode_topology(&encoded).unwrap(), nested);

        let nested = RawTopology::Nested(RawNestedLeaf {
            weight: 1,
            threshold: MAX_THRESHOLD + 1,
            tree: Box::new(signer(1)),
        });
        assert_eq!(
            encode_topology(&nested),
            Err(EncodeError::ThresholdTooLarge(1 << 20)),
        );
    }

    #[test]
    fn empty_buffer_fails() {
        assert_eq!(decode_signature(&[]), Err(DecodeError::EmptySignature));
    }

    #[test]
    fn truncated_address_leaf_fails() {
        // Valid prefix, then a flag-1 header expecting 20 address bytes
        // that never arrive.
        let mut bytes = vec![0x00, 0x00, 0x00, 0x01];
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.push((FLAG_ADDRESS << 4) | 1);
        assert_eq!(
            decode_signature(&bytes),
            Err(DecodeError::NotEnoughBytes { needed: 20, available: 0 }),
        );
    }

    #[test]
    fn unknown_flag_fails() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x01];
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.push(11 << 4);
        assert_eq!(decode_signature(&bytes), Err(DecodeError::UnknownFlag(11)));
    }

    #[test]
    fn ecdsa_signature_roundtrip_preserves_parity() {
        for y_parity in [false, true] {
            let signature = unchained(RawTopology::Signed(UnrecoveredSigner {
                weight: 3,
                signature: SignatureKind::Hash(ecdsa(y_parity)),
            }));
            assert_eq!(roundtrip(&signature), signature);
        }
    }

    #[test]
    fn eth_sign_flag_is_distinct() {
        let node = RawTopology::Signed(UnrecoveredSigner {
            weight: 1,
            signature: SignatureKind::EthSign(ecdsa(false)),
        });
        let encoded = encode_topology(&node).unwrap();
        assert_eq!(encoded[0] >> 4, FLAG_SIGNATURE_ETH_SIGN);
        assert_eq!(decode_topology(&encoded).unwrap(), node);
    }

    #[test]
    fn contract_signature_roundtrips() {
        let kinds: [fn(Address, Bytes) -> SignatureKind; 3] = [
            |address, data| SignatureKind::Erc1271 { address, data },
            |address, data| SignatureKind::Sapient { address, data },
            |address, data| SignatureKind::SapientCompact { address, data },
        ];
        for make in kinds {
            for data in [Bytes::new(), Bytes::from(vec![0xab; 70])] {
                let node = RawTopology::Signed(UnrecoveredSigner {
                    weight: 200,
                    signature: make(Address::random(), data),
                });
                let encoded = encode_topology(&node).unwrap();
                assert_eq!(decode_topology(&encoded).unwrap(), node);
            }
        }
    }

    #[test]
    fn right_nested_branch_uses_a_sized_wrapper() {
        let tree = RawTopology::Branch(
            Box::new(signer(1)),
            Box::new(RawTopology::Branch(Box::new(signer(2)), Box::new(signer(3)))),
        );
        let encoded = encode_topology(&tree).unwrap();
        // left leaf (21 bytes), then the branch wrapper.
        assert_eq!(encoded[21] >> 4, FLAG_BRANCH);
        assert_eq!(decode_topology(&encoded).unwrap(), tree);
    }

    #[test]
    fn left_spine_flattens_without_wrappers() {
        let tree = RawTopology::Branch(
            Box::new(RawTopology::Branch(Box::new(signer(1)), Box::new(signer(2)))),
            Box::new(signer(3)),
        );
        let encoded = encode_topology(&tree).unwrap();
        // Three plain leaves, no branch marker anywhere.
        assert_eq!(encoded.len(), 3 * 21);
        assert_eq!(decode_topology(&encoded).unwrap(), tree);
    }

    #[test]
    fn empty_branch_wrapper_fails() {
        let bytes = [(FLAG_BRANCH << 4), 0x00, 0x00, 0x00];
        assert_eq!(decode_topology(&bytes), Err(DecodeError::EmptyBranch));
    }

    #[test]
    fn unsigned_sapient_is_pruned_to_its_leaf_hash() {
        let leaf = SapientSignerLeaf::new(Address::random(), 9, B256::random());
        let encoded = encode_topology(&RawTopology::UnsignedSapient(leaf.clone())).unwrap();
        assert_eq!(
            decode_topology(&encoded).unwrap(),
            RawTopology::Node(NodeLeaf { hash: leaf.hash() }),
        );
    }

    #[test]
    fn checkpointer_fields_roundtrip() {
        let mut signature = unchained(signer(1));
        signature.configuration.checkpointer = Some(Address::random());
        signature.checkpointer_data = Some(Bytes::from(vec![1, 2, 3, 4]));
        signature.no_chain_id = true;
        assert_eq!(roundtrip(&signature), signature);
    }

    #[test]
    fn omit_options_drop_checkpointer_fields() {
        let mut signature = unchained(signer(1));
        signature.configuration.checkpointer = Some(Address::random());
        signature.checkpointer_data = Some(Bytes::from(vec![1, 2, 3, 4]));

        let full = signature.encode().unwrap();
        let without_data = signature
            .encode_with(EncodeOptions { omit_checkpointer_data: true, ..Default::default() })
            .unwrap();
        let bare = signature
            .encode_with(EncodeOptions { omit_checkpointer: true, omit_checkpointer_data: true })
            .unwrap();
        assert!(without_data.len() < full.len());
        assert!(bare.len() < without_data.len());

        let decoded = decode_signature(&bare).unwrap();
        assert_eq!(decoded.configuration.checkpointer, None);
        assert_eq!(decoded.checkpointer_data, None);
    }

    #[test]
    fn chained_signature_roundtrips() {
        let mut link = unchained(signer(2));
        link.no_chain_id = true;
        let mut signature = unchained(RawTopology::Branch(
            Box::new(signer(1)),
            Box::new(RawTopology::Subdigest(SubdigestLeaf { digest: B256::random() })),
        ));
        signature.suffix = vec![link, unchained(signer(4))];

        let encoded = signature.encode().unwrap();
        assert_eq!(encoded[0] & CONTROL_CHAINED, CONTROL_CHAINED);
        assert_eq!(RawSignature::decode(&encoded).unwrap(), signature);
    }

    fn arb_ecdsa() -> impl Strategy<Value = Signature> {
        (any::<[u8; 32]>(), any::<[u8; 32]>(), any::<bool>()).prop_map(|(r, mut s, parity)| {
            // Keep s in the low half so the compact packing is lossless.
            s[0] &= 0x7f;
            Signature::new(U256::from_be_bytes(r), U256::from_be_bytes(s), parity)
        })
    }

    fn arb_contract_data() -> impl Strategy<Value = Bytes> {
        proptest::collection::vec(any::<u8>(), 0..48).prop_map(Bytes::from)
    }

    fn arb_leaf() -> impl Strategy<Value = RawTopology> {
        prop_oneof![
            (any::<[u8; 20]>(), 0..=MAX_WEIGHT).prop_map(|(address, weight)| {
                RawTopology::Unsigned(SignerLeaf {
                    address: Address::from(address),
                    weight,
                    signed: false,
                })
            }),
            (0..=MAX_WEIGHT, arb_ecdsa()).prop_map(|(weight, sig)| RawTopology::Signed(
                UnrecoveredSigner { weight, signature: SignatureKind::Hash(sig) }
            )),
            (0..=MAX_WEIGHT, arb_ecdsa()).prop_map(|(weight, sig)| RawTopology::Signed(
                UnrecoveredSigner { weight, signature: SignatureKind::EthSign(sig) }
            )),
            (0..=MAX_WEIGHT, any::<[u8; 20]>(), arb_contract_data()).prop_map(
                |(weight, address, data)| RawTopology::Signed(UnrecoveredSigner {
                    weight,
                    signature: SignatureKind::Erc1271 { address: Address::from(address), data },
                })
            ),
            (0..=MAX_WEIGHT, any::<[u8; 20]>(), arb_contract_data()).prop_map(
                |(weight, address, data)| RawTopology::Signed(UnrecoveredSigner {
                    weight,
                    signature: SignatureKind::Sapient { address: Address::from(address), data },
                })
            ),
            any::<[u8; 32]>().prop_map(|digest| {
                RawTopology::Subdigest(SubdigestLeaf { digest: B256::from(digest) })
            }),
            any::<[u8; 32]>().prop_map(|digest| {
                RawTopology::AnyAddressSubdigest(AnyAddressSubdigestLeaf {
                    digest: B256::from(digest),
                })
            }),
            any::<[u8; 32]>()
                .prop_map(|hash| RawTopology::Node(NodeLeaf { hash: B256::from(hash) })),
        ]
    }

    fn arb_topology() -> impl Strategy<Value = RawTopology> {
        arb_leaf().prop_recursive(3, 24, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(left, right)| {
                    RawTopology::Branch(Box::new(left), Box::new(right))
                }),
                (0..=MAX_WEIGHT, 0..=MAX_THRESHOLD, inner).prop_map(
                    |(weight, threshold, tree)| RawTopology::Nested(RawNestedLeaf {
                        weight,
                        threshold,
                        tree: Box::new(tree),
                    })
                ),
            ]
        })
    }

    proptest! {
        #[test]
        fn signature_roundtrip(
            topology in arb_topology(),
            threshold in 0..=MAX_THRESHOLD,
            checkpoint in 0..=MAX_CHECKPOINT,
            no_chain_id in any::<bool>(),
            checkpointer in proptest::option::of(any::<[u8; 20]>()),
        ) {
            let signature = RawSignature {
                no_chain_id,
                checkpointer_data: None,
                configuration: RawWalletConfig {
                    threshold,
                    checkpoint,
                    topology,
                    checkpointer: checkpointer.map(Address::from),
                },
                suffix: Vec::new(),
            };
            let encoded = encode_signature(&signature, EncodeOptions::default()).unwrap();
            prop_assert_eq!(decode_signature(&encoded).unwrap(), signature);
        }
    }
}
