//! Path parameter validation.
//!
//! Every value extracted from a request path goes through one of the
//! parsers below before any call to the node is attempted. Parsers are pure:
//! they either return a typed value or a [`ValidationError`] naming the
//! offending input.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The kind of value a path segment was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Address,
    Hash,
    Quantity,
    BlockNumberOrTag,
    Data,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Address => "address",
            ParamKind::Hash => "hash",
            ParamKind::Quantity => "quantity",
            ParamKind::BlockNumberOrTag => "block number or tag",
            ParamKind::Data => "data",
        };
        f.write_str(name)
    }
}

/// A path parameter that could not be converted to its target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} {value:?}: {reason}")]
pub struct ValidationError {
    pub value: String,
    pub kind: ParamKind,
    pub reason: &'static str,
}

impl ValidationError {
    fn new(value: &str, kind: ParamKind, reason: &'static str) -> Self {
        Self {
            value: value.to_string(),
            kind,
            reason,
        }
    }
}

/// Non-negative integer limited to the u64 range.
///
/// Serializes to the JSON-RPC wire form (`0x`-prefixed minimal hex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(pub u64);

impl Quantity {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Parse the wire form, e.g. `0x1b4`.
    pub fn from_hex(raw: &str) -> Result<Self, ValidationError> {
        let digits = strip_hex_prefix(raw)
            .ok_or_else(|| ValidationError::new(raw, ParamKind::Quantity, "missing 0x prefix"))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::new(
                raw,
                ParamKind::Quantity,
                "expected hex digits",
            ));
        }
        u64::from_str_radix(digits, 16).map(Quantity).map_err(|_| {
            ValidationError::new(raw, ParamKind::Quantity, "exceeds 64-bit unsigned range")
        })
    }

    /// Render the wire form.
    pub fn to_hex(self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Quantity::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// A block selector as understood by `eth_getLogs` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockNumberOrTag {
    Number(Quantity),
    Latest,
    Earliest,
    Pending,
}

impl FromStr for BlockNumberOrTag {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "latest" => Ok(BlockNumberOrTag::Latest),
            "earliest" => Ok(BlockNumberOrTag::Earliest),
            "pending" => Ok(BlockNumberOrTag::Pending),
            _ => Quantity::from_hex(raw)
                .map(BlockNumberOrTag::Number)
                .map_err(|e| ValidationError::new(raw, ParamKind::BlockNumberOrTag, e.reason)),
        }
    }
}

impl fmt::Display for BlockNumberOrTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockNumberOrTag::Number(q) => f.write_str(&q.to_hex()),
            BlockNumberOrTag::Latest => f.write_str("latest"),
            BlockNumberOrTag::Earliest => f.write_str("earliest"),
            BlockNumberOrTag::Pending => f.write_str("pending"),
        }
    }
}

impl Serialize for BlockNumberOrTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockNumberOrTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn strip_hex_prefix(raw: &str) -> Option<&str> {
    raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))
}

/// Checks `0x` followed by exactly `len` hex characters.
fn check_fixed_hex(raw: &str, kind: ParamKind, len: usize) -> Result<(), ValidationError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ValidationError::new(raw, kind, "missing 0x prefix"))?;
    if digits.len() != len {
        return Err(ValidationError::new(raw, kind, "wrong number of hex digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::new(raw, kind, "contains non-hex characters"));
    }
    Ok(())
}

/// Parse a `0x`-prefixed, 40 hex digit account address.
pub fn parse_address(raw: &str) -> Result<Address, ValidationError> {
    check_fixed_hex(raw, ParamKind::Address, 40)?;
    raw.parse::<Address>()
        .map_err(|_| ValidationError::new(raw, ParamKind::Address, "malformed address"))
}

/// Parse a `0x`-prefixed, 64 hex digit hash (block, transaction or topic).
pub fn parse_hash(raw: &str) -> Result<B256, ValidationError> {
    check_fixed_hex(raw, ParamKind::Hash, 64)?;
    raw.parse::<B256>()
        .map_err(|_| ValidationError::new(raw, ParamKind::Hash, "malformed hash"))
}

/// Parse a base-10 quantity as it appears in request paths.
pub fn parse_quantity(raw: &str) -> Result<Quantity, ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            raw,
            ParamKind::Quantity,
            "expected decimal digits",
        ));
    }
    raw.parse::<u64>().map(Quantity).map_err(|_| {
        ValidationError::new(raw, ParamKind::Quantity, "exceeds 64-bit unsigned range")
    })
}

/// Parse a block selector in wire form: a tag or a hex quantity.
pub fn parse_block_number_or_tag(raw: &str) -> Result<BlockNumberOrTag, ValidationError> {
    raw.parse()
}

/// Parse `0x`-prefixed call data. `0x` alone is the empty payload.
pub fn parse_data(raw: &str) -> Result<Bytes, ValidationError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ValidationError::new(raw, ParamKind::Data, "missing 0x prefix"))?;
    if digits.len() % 2 != 0 {
        return Err(ValidationError::new(
            raw,
            ParamKind::Data,
            "odd number of hex digits",
        ));
    }
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|_| ValidationError::new(raw, ParamKind::Data, "contains non-hex characters"))
}
