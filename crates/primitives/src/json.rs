//! Lossless JSON form of configurations and raw signatures.
//!
//! Integers ride as decimal strings so arbitrary-precision readers never
//! lose them; addresses are EIP-55 checksummed; hashes and byte strings
//! are 0x-hex. Leaves are tagged objects, an opaque node hash is a bare
//! hex string, and a branch is a 2-element array. Serialization is
//! deterministic (keys sort alphabetically), so a round trip reproduces
//! the exact text.

use alloy_primitives::{Address, B256, Bytes, Signature, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::WalletConfig;
use crate::signature::{RawSignature, RawWalletConfig, SignatureKind, UnrecoveredSigner};
use crate::topology::{
    AnyAddressSubdigestLeaf, NestedLeaf, NodeLeaf, RawNestedLeaf, RawTopology, SapientSignerLeaf,
    SignerLeaf, SubdigestLeaf, Topology,
};

/// JSON bridge failures. All fatal; the payload is malformed or uses a
/// tag this version does not know.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error("unknown type tag `{0}`")]
    UnknownTag(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl RawSignature {
    pub fn to_json(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&raw_signature_to_value(self))?)
    }

    pub fn from_json(json: &str) -> Result<Self, JsonError> {
        raw_signature_from_value(&serde_json::from_str(json)?)
    }
}

impl WalletConfig {
    pub fn to_json(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&config_to_value(self))?)
    }

    pub fn from_json(json: &str) -> Result<Self, JsonError> {
        config_from_value(&serde_json::from_str(json)?)
    }
}

impl Serialize for Topology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        topology_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Topology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        topology_from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for RawTopology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        raw_topology_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawTopology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        raw_topology_from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for WalletConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        config_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WalletConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        config_from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for RawSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        raw_signature_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        raw_signature_from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn topology_to_value(topology: &Topology) -> Value {
    match topology {
        Topology::Signer(leaf) => signer_to_value(leaf),
        Topology::SapientSigner(leaf) => sapient_to_value(leaf),
        Topology::Subdigest(leaf) => digest_to_value("subdigest", leaf.digest),
        Topology::AnyAddressSubdigest(leaf) => {
            digest_to_value("any-address-subdigest", leaf.digest)
        }
        Topology::Node(leaf) => Value::String(leaf.hash.to_string()),
        Topology::Nested(leaf) => {
            nested_to_value(leaf.weight, leaf.threshold, topology_to_value(&leaf.tree))
        }
        Topology::Branch(left, right) => {
            Value::Array(vec![topology_to_value(left), topology_to_value(right)])
        }
    }
}

fn topology_from_value(value: &Value) -> Result<Topology, JsonError> {
    match value {
        Value::String(_) => Ok(Topology::Node(NodeLeaf { hash: parse_b256("topology", value)? })),
        Value::Array(items) => {
            let [left, right] = branch_pair(items)?;
            Ok(Topology::branch(topology_from_value(left)?, topology_from_value(right)?))
        }
        Value::Object(map) => match tag(map)? {
            "signer" => Ok(Topology::Signer(signer_from_map(map)?)),
            "sapient-signer" => Ok(Topology::SapientSigner(sapient_from_map(map)?)),
            "subdigest" => {
                Ok(Topology::Subdigest(SubdigestLeaf { digest: parse_b256_field(map, "digest")? }))
            }
            "any-address-subdigest" => Ok(Topology::AnyAddressSubdigest(AnyAddressSubdigestLeaf {
                digest: parse_b256_field(map, "digest")?,
            })),
            "nested" => Ok(Topology::Nested(NestedLeaf {
                weight: parse_u64_field(map, "weight")?,
                threshold: parse_u64_field(map, "threshold")?,
                tree: Box::new(topology_from_value(field(map, "tree")?)?),
            })),
            other => Err(JsonError::UnknownTag(other.to_owned())),
        },
        _ => Err(JsonError::InvalidValue {
            field: "topology",
            reason: "expected object, hex string, or 2-element array".into(),
        }),
    }
}

fn raw_topology_to_value(topology: &RawTopology) -> Value {
    match topology {
        RawTopology::Unsigned(leaf) => signer_to_value(leaf),
        RawTopology::UnsignedSapient(leaf) => sapient_to_value(leaf),
        RawTopology::Signed(signer) => {
            let mut map = Map::new();
            map.insert("type".into(), Value::String("unrecovered-signer".into()));
            map.insert("weight".into(), Value::String(signer.weight.to_string()));
            map.insert("signature".into(), signature_kind_to_value(&signer.signature));
            Value::Object(map)
        }
        RawTopology::Subdigest(leaf) => digest_to_value("subdigest", leaf.digest),
        RawTopology::AnyAddressSubdigest(leaf) => {
            digest_to_value("any-address-subdigest", leaf.digest)
        }
        RawTopology::Node(leaf) => Value::String(leaf.hash.to_string()),
        RawTopology::Nested(leaf) => {
            nested_to_value(leaf.weight, leaf.threshold, raw_topology_to_value(&leaf.tree))
        }
        RawTopology::Branch(left, right) => {
            Value::Array(vec![raw_topology_to_value(left), raw_topology_to_value(right)])
        }
    }
}

fn raw_topology_from_value(value: &Value) -> Result<RawTopology, JsonError> {
    match value {
        Value::String(_) => {
            Ok(RawTopology::Node(NodeLeaf { hash: parse_b256("topology", value)? }))
        }
        Value::Array(items) => {
            let [left, right] = branch_pair(items)?;
            Ok(RawTopology::Branch(
                Box::new(raw_topology_from_value(left)?),
                Box::new(raw_topology_from_value(right)?),
            ))
        }
        Value::Object(map) => match tag(map)? {
            "signer" => Ok(RawTopology::Unsigned(signer_from_map(map)?)),
            "sapient-signer" => Ok(RawTopology::UnsignedSapient(sapient_from_map(map)?)),
            "unrecovered-signer" => Ok(RawTopology::Signed(UnrecoveredSigner {
                weight: parse_u64_field(map, "weight")?,
                signature: signature_kind_from_value(field(map, "signature")?)?,
            })),
            "subdigest" => Ok(RawTopology::Subdigest(SubdigestLeaf {
                digest: parse_b256_field(map, "digest")?,
            })),
            "any-address-subdigest" => {
                Ok(RawTopology::AnyAddressSubdigest(AnyAddressSubdigestLeaf {
                    digest: parse_b256_field(map, "digest")?,
                }))
            }
            "nested" => Ok(RawTopology::Nested(RawNestedLeaf {
                weight: parse_u64_field(map, "weight")?,
                threshold: parse_u64_field(map, "threshold")?,
                tree: Box::new(raw_topology_from_value(field(map, "tree")?)?),
            })),
            other => Err(JsonError::UnknownTag(other.to_owned())),
        },
        _ => Err(JsonError::InvalidValue {
            field: "topology",
            reason: "expected object, hex string, or 2-element array".into(),
        }),
    }
}

fn signature_kind_to_value(kind: &SignatureKind) -> Value {
    let mut map = Map::new();
    match kind {
        SignatureKind::Hash(signature) | SignatureKind::EthSign(signature) => {
            let tag = if matches!(kind, SignatureKind::Hash(_)) { "hash" } else { "eth_sign" };
            map.insert("type".into(), Value::String(tag.into()));
            map.insert("r".into(), Value::String(B256::from(signature.r()).to_string()));
            map.insert("s".into(), Value::String(B256::from(signature.s()).to_string()));
            map.insert("yParity".into(), Value::from(u8::from(signature.v())));
        }
        SignatureKind::Erc1271 { address, data }
        | SignatureKind::Sapient { address, data }
        | SignatureKind::SapientCompact { address, data } => {
            let tag = match kind {
                SignatureKind::Erc1271 { .. } => "erc1271",
                SignatureKind::Sapient { .. } => "sapient",
                _ => "sapient_compact",
            };
            map.insert("type".into(), Value::String(tag.into()));
            map.insert("address".into(), Value::String(address.to_string()));
            map.insert("data".into(), Value::String(data.to_string()));
        }
    }
    Value::Object(map)
}

fn signature_kind_from_value(value: &Value) -> Result<SignatureKind, JsonError> {
    let Value::Object(map) = value else {
        return Err(JsonError::InvalidValue {
            field: "signature",
            reason: "expected an object".into(),
        });
    };
    match tag(map)? {
        kind @ ("hash" | "eth_sign") => {
            let r = U256::from_be_bytes(parse_b256_field(map, "r")?.0);
            let s = U256::from_be_bytes(parse_b256_field(map, "s")?.0);
            let y_parity = match field(map, "yParity")?.as_u64() {
                Some(0) => false,
                Some(1) => true,
                _ => {
                    return Err(JsonError::InvalidValue {
                        field: "yParity",
                        reason: "expected 0 or 1".into(),
                    });
                }
            };
            let signature = Signature::new(r, s, y_parity);
            Ok(if kind == "hash" {
                SignatureKind::Hash(signature)
            } else {
                SignatureKind::EthSign(signature)
            })
        }
        kind @ ("erc1271" | "sapient" | "sapient_compact") => {
            let address = parse_address_field(map, "address")?;
            let data = parse_bytes_field(map, "data")?;
            Ok(match kind {
                "erc1271" => SignatureKind::Erc1271 { address, data },
                "sapient" => SignatureKind::Sapient { address, data },
                _ => SignatureKind::SapientCompact { address, data },
            })
        }
        other => Err(JsonError::UnknownTag(other.to_owned())),
    }
}

fn config_to_value(config: &WalletConfig) -> Value {
    let mut map = config_fields(config.threshold, config.checkpoint, config.checkpointer);
    map.insert("topology".into(), topology_to_value(&config.topology));
    Value::Object(map)
}

fn config_from_value(value: &Value) -> Result<WalletConfig, JsonError> {
    let map = object(value, "configuration")?;
    Ok(WalletConfig {
        threshold: parse_u64_field(map, "threshold")?,
        checkpoint: parse_u64_field(map, "checkpoint")?,
        topology: topology_from_value(field(map, "topology")?)?,
        checkpointer: parse_checkpointer(map)?,
    })
}

fn raw_config_to_value(config: &RawWalletConfig) -> Value {
    let mut map = config_fields(config.threshold, config.checkpoint, config.checkpointer);
    map.insert("topology".into(), raw_topology_to_value(&config.topology));
    Value::Object(map)
}

fn raw_config_from_value(value: &Value) -> Result<RawWalletConfig, JsonError> {
    let map = object(value, "configuration")?;
    Ok(RawWalletConfig {
        threshold: parse_u64_field(map, "threshold")?,
        checkpoint: parse_u64_field(map, "checkpoint")?,
        topology: raw_topology_from_value(field(map, "topology")?)?,
        checkpointer: parse_checkpointer(map)?,
    })
}

fn raw_signature_to_value(signature: &RawSignature) -> Value {
    let mut map = Map::new();
    map.insert("noChainId".into(), Value::Bool(signature.no_chain_id));
    if let Some(data) = &signature.checkpointer_data {
        map.insert("checkpointerData".into(), Value::String(data.to_string()));
    }
    map.insert("configuration".into(), raw_config_to_value(&signature.configuration));
    if !signature.suffix.is_empty() {
        map.insert(
            "suffix".into(),
            Value::Array(signature.suffix.iter().map(raw_signature_to_value).collect()),
        );
    }
    Value::Object(map)
}

fn raw_signature_from_value(value: &Value) -> Result<RawSignature, JsonError> {
    let map = object(value, "signature")?;
    let suffix = match map.get("suffix") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            items.iter().map(raw_signature_from_value).collect::<Result<_, _>>()?
        }
        Some(_) => {
            return Err(JsonError::InvalidValue {
                field: "suffix",
                reason: "expected an array".into(),
            });
        }
    };
    Ok(RawSignature {
        no_chain_id: match map.get("noChainId") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(JsonError::InvalidValue {
                    field: "noChainId",
                    reason: "expected a boolean".into(),
                });
            }
        },
        checkpointer_data: map
            .get("checkpointerData")
            .map(|value| parse_bytes("checkpointerData", value))
            .transpose()?,
        configuration: raw_config_from_value(field(map, "configuration")?)?,
        suffix,
    })
}

fn signer_to_value(leaf: &SignerLeaf) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::String("signer".into()));
    map.insert("address".into(), Value::String(leaf.address.to_string()));
    map.insert("weight".into(), Value::String(leaf.weight.to_string()));
    if leaf.signed {
        map.insert("signed".into(), Value::Bool(true));
    }
    Value::Object(map)
}

fn signer_from_map(map: &Map<String, Value>) -> Result<SignerLeaf, JsonError> {
    Ok(SignerLeaf {
        address: parse_address_field(map, "address")?,
        weight: parse_u64_field(map, "weight")?,
        signed: parse_signed(map)?,
    })
}

fn sapient_to_value(leaf: &SapientSignerLeaf) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::String("sapient-signer".into()));
    map.insert("address".into(), Value::String(leaf.address.to_string()));
    map.insert("weight".into(), Value::String(leaf.weight.to_string()));
    map.insert("imageHash".into(), Value::String(leaf.image_hash.to_string()));
    if leaf.signed {
        map.insert("signed".into(), Value::Bool(true));
    }
    Value::Object(map)
}

fn sapient_from_map(map: &Map<String, Value>) -> Result<SapientSignerLeaf, JsonError> {
    Ok(SapientSignerLeaf {
        address: parse_address_field(map, "address")?,
        weight: parse_u64_field(map, "weight")?,
        image_hash: parse_b256_field(map, "imageHash")?,
        signed: parse_signed(map)?,
    })
}

fn digest_to_value(tag: &str, digest: B256) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::String(tag.into()));
    map.insert("digest".into(), Value::String(digest.to_string()));
    Value::Object(map)
}

fn nested_to_value(weight: u64, threshold: u64, tree: Value) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::String("nested".into()));
    map.insert("weight".into(), Value::String(weight.to_string()));
    map.insert("threshold".into(), Value::String(threshold.to_string()));
    map.insert("tree".into(), tree);
    Value::Object(map)
}

fn config_fields(
    threshold: u64,
    checkpoint: u64,
    checkpointer: Option<Address>,
) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("threshold".into(), Value::String(threshold.to_string()));
    map.insert("checkpoint".into(), Value::String(checkpoint.to_string()));
    if let Some(address) = checkpointer {
        map.insert("checkpointer".into(), Value::String(address.to_string()));
    }
    map
}

fn parse_checkpointer(map: &Map<String, Value>) -> Result<Option<Address>, JsonError> {
    map.get("checkpointer").map(|value| parse_address("checkpointer", value)).transpose()
}

fn parse_signed(map: &Map<String, Value>) -> Result<bool, JsonError> {
    match map.get("signed") {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => {
            Err(JsonError::InvalidValue { field: "signed", reason: "expected a boolean".into() })
        }
    }
}

fn object<'a>(value: &'a Value, name: &'static str) -> Result<&'a Map<String, Value>, JsonError> {
    value.as_object().ok_or(JsonError::InvalidValue { field: name, reason: "expected an object".into() })
}

fn tag(map: &Map<String, Value>) -> Result<&str, JsonError> {
    field(map, "type")?
        .as_str()
        .ok_or(JsonError::InvalidValue { field: "type", reason: "expected a string".into() })
}

fn field<'a>(map: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, JsonError> {
    map.get(name).ok_or(JsonError::MissingField(name))
}

fn parse_u64_field(map: &Map<String, Value>, name: &'static str) -> Result<u64, JsonError> {
    let value = field(map, name)?;
    let text = value.as_str().ok_or(JsonError::InvalidValue {
        field: name,
        reason: "expected a decimal string".into(),
    })?;
    text.parse().map_err(|err| JsonError::InvalidValue { field: name, reason: format!("{err}") })
}

fn parse_address_field(map: &Map<String, Value>, name: &'static str) -> Result<Address, JsonError> {
    parse_address(name, field(map, name)?)
}

fn parse_address(name: &'static str, value: &Value) -> Result<Address, JsonError> {
    let text = value.as_str().ok_or(JsonError::InvalidValue {
        field: name,
        reason: "expected a hex string".into(),
    })?;
    text.parse().map_err(|err| JsonError::InvalidValue { field: name, reason: format!("{err}") })
}

fn parse_b256_field(map: &Map<String, Value>, name: &'static str) -> Result<B256, JsonError> {
    parse_b256(name, field(map, name)?)
}

fn parse_b256(name: &'static str, value: &Value) -> Result<B256, JsonError> {
    let text = value.as_str().ok_or(JsonError::InvalidValue {
        field: name,
        reason: "expected a hex string".into(),
    })?;
    text.parse().map_err(|err| JsonError::InvalidValue { field: name, reason: format!("{err}") })
}

fn parse_bytes_field(map: &Map<String, Value>, name: &'static str) -> Result<Bytes, JsonError> {
    parse_bytes(name, field(map, name)?)
}

fn parse_bytes(name: &'static str, value: &Value) -> Result<Bytes, JsonError> {
    let text = value.as_str().ok_or(JsonError::InvalidValue {
        field: name,
        reason: "expected a hex string".into(),
    })?;
    text.parse().map_err(|err| JsonError::InvalidValue { field: name, reason: format!("{err}") })
}

fn branch_pair(items: &[Value]) -> Result<[&Value; 2], JsonError> {
    match items {
        [left, right] => Ok([left, right]),
        _ => Err(JsonError::InvalidValue {
            field: "topology",
            reason: format!("a branch must have exactly 2 elements, got {}", items.len()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signature() -> RawSignature {
        let ecdsa = Signature::new(U256::from(7u64), U256::from(11u64), true);
        RawSignature {
            no_chain_id: true,
            checkpointer_data: Some(Bytes::from(vec![0xde, 0xad])),
            configuration: RawWalletConfig {
                threshold: 3,
                checkpoint: 17,
                checkpointer: Some(Address::random()),
                topology: RawTopology::Branch(
                    Box::new(RawTopology::Signed(UnrecoveredSigner {
                        weight: 2,
                        signature: SignatureKind::Hash(ecdsa),
                    })),
                    Box::new(RawTopology::Branch(
                        Box::new(RawTopology::Unsigned(SignerLeaf::new(Address::random(), 20))),
                        Box::new(RawTopology::Nested(RawNestedLeaf {
                            weight: 1,
                            threshold: 2,
                            tree: Box::new(RawTopology::Signed(UnrecoveredSigner {
                                weight: 1,
                                signature: SignatureKind::Erc1271 {
                                    address: Address::random(),
                                    data: Bytes::from(vec![1, 2, 3]),
                                },
                            })),
                        })),
                    )),
                ),
            },
            suffix: vec![RawSignature::new(RawWalletConfig {
                threshold: 1,
                checkpoint: 18,
                checkpointer: None,
                topology: RawTopology::Node(NodeLeaf { hash: B256::random() }),
            })],
        }
    }

    #[test]
    fn raw_signature_roundtrip_is_idempotent() {
        let signature = sample_signature();
        let json = signature.to_json().unwrap();
        let parsed = RawSignature::from_json(&json).unwrap();
        assert_eq!(parsed, signature);
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn integers_serialize_as_decimal_strings() {
        let json = sample_signature().to_json().unwrap();
        assert!(json.contains(r#""threshold":"3""#));
        assert!(json.contains(r#""checkpoint":"17""#));
        assert!(json.contains(r#""weight":"20""#));
    }

    #[test]
    fn node_leaf_is_a_bare_hex_string() {
        let hash = B256::random();
        let config = WalletConfig::new(1, 0, Topology::node(hash));
        let json = config.to_json().unwrap();
        assert!(json.contains(&format!(r#""topology":"{hash}""#)));
        assert_eq!(WalletConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn branch_is_a_two_element_array() {
        let config = WalletConfig::new(
            1,
            0,
            Topology::branch(
                Topology::signer(Address::random(), 1),
                Topology::subdigest(B256::random()),
            ),
        );
        let json = config.to_json().unwrap();
        assert!(json.contains(r#""topology":[{"#));
        assert_eq!(WalletConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn every_leaf_kind_roundtrips() {
        let config = WalletConfig::new(
            2,
            5,
            Topology::branch(
                Topology::branch(
                    Topology::signer(Address::random(), 0),
                    Topology::sapient_signer(Address::random(), 255, B256::random()),
                ),
                Topology::branch(
                    Topology::any_address_subdigest(B256::random()),
                    Topology::nested(4, 2, Topology::node(B256::random())),
                ),
            ),
        );
        let json = config.to_json().unwrap();
        assert_eq!(WalletConfig::from_json(&json).unwrap(), config);
        assert_eq!(WalletConfig::from_json(&json).unwrap().to_json().unwrap(), json);
    }

    #[test]
    fn signed_marker_survives_when_set() {
        let mut leaf = SignerLeaf::new(Address::random(), 1);
        leaf.signed = true;
        let config = WalletConfig::new(1, 0, Topology::Signer(leaf));
        let json = config.to_json().unwrap();
        assert!(json.contains(r#""signed":true"#));
        assert_eq!(WalletConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn unknown_tag_fails() {
        let json = r#"{"threshold":"1","checkpoint":"0","topology":{"type":"quantum-signer"}}"#;
        assert!(matches!(
            WalletConfig::from_json(json),
            Err(JsonError::UnknownTag(tag)) if tag == "quantum-signer",
        ));
    }

    #[test]
    fn malformed_json_fails() {
        assert!(matches!(RawSignature::from_json("{"), Err(JsonError::Parse(_))));
    }

    #[test]
    fn non_decimal_weight_fails() {
        let json = r#"{"threshold":"1","checkpoint":"0","topology":{"type":"signer","address":"0x0000000000000000000000000000000000000001","weight":5}}"#;
        assert!(matches!(
            WalletConfig::from_json(json),
            Err(JsonError::InvalidValue { field: "weight", .. }),
        ));
    }

    #[test]
    fn signature_kind_tags_roundtrip() {
        for kind in [
            SignatureKind::EthSign(Signature::new(U256::from(1u64), U256::from(2u64), false)),
            SignatureKind::Sapient { address: Address::random(), data: Bytes::new() },
            SignatureKind::SapientCompact {
                address: Address::random(),
                data: Bytes::from(vec![9]),
            },
        ] {
            let signature = RawSignature::new(RawWalletConfig {
                threshold: 1,
                checkpoint: 0,
                checkpointer: None,
                topology: RawTopology::Signed(UnrecoveredSigner { weight: 1, signature: kind }),
            });
            let json = signature.to_json().unwrap();
            assert_eq!(RawSignature::from_json(&json).unwrap(), signature);
        }
    }
}
