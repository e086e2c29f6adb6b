// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! EIP-712 hashing of Snapshot votes.
//!
//! Snapshot only ever asks us to sign one message type, so instead of a generic typed-data
//! encoder the `Vote` struct is described by a fixed field table and hashed with two plain
//! functions: [`domain_separator`] and [`struct_hash`], composed in [`digest`].
//! Refer to <https://eips.ethereum.org/EIPS/eip-712>.

use crate::vote::{VoteMessage, APP_TAG, DOMAIN_NAME, DOMAIN_VERSION, EMPTY_METADATA};
use ethers::abi::{self, Token};
use ethers::types::{Address, H256, U256};
use ethers::utils::keccak256;
use thiserror::Error;

pub const VOTE_TYPE: &str = "Vote";
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// Every signing payload starts with these two bytes, followed by the domain separator and
/// the struct hash.
const SIGNING_PREFIX: [u8; 2] = [0x19, 0x01];

/// The solidity types used by the vote and domain structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Address,
    String,
    Uint64,
    Bytes32,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Address => "address",
            FieldType::String => "string",
            FieldType::Uint64 => "uint64",
            FieldType::Bytes32 => "bytes32",
        }
    }
}

/// Fields of the `Vote` struct in the order they are hashed.
pub const VOTE_FIELDS: [(&str, FieldType); 8] = [
    ("from", FieldType::Address),
    ("space", FieldType::String),
    ("timestamp", FieldType::Uint64),
    ("proposal", FieldType::Bytes32),
    ("choice", FieldType::String),
    ("reason", FieldType::String),
    ("app", FieldType::String),
    ("metadata", FieldType::String),
];

/// Fields of the `EIP712Domain` struct. Snapshot only sets name and version.
pub const DOMAIN_FIELDS: [(&str, FieldType); 2] =
    [("name", FieldType::String), ("version", FieldType::String)];

/// A typed field value ready to be hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Address(Address),
    String(String),
    Uint64(u64),
    Bytes32([u8; 32]),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Address(_) => FieldType::Address,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Uint64(_) => FieldType::Uint64,
            FieldValue::Bytes32(_) => FieldType::Bytes32,
        }
    }

    /// The 32 byte word this value contributes to `encodeData`. Dynamic values (strings) are
    /// replaced by their keccak256 hash, static values are abi encoded in place.
    fn to_token(&self) -> Token {
        match self {
            FieldValue::Address(address) => Token::Address(*address),
            FieldValue::String(s) => Token::FixedBytes(keccak256(s.as_bytes()).to_vec()),
            FieldValue::Uint64(n) => Token::Uint(U256::from(*n)),
            FieldValue::Bytes32(bytes) => Token::FixedBytes(bytes.to_vec()),
        }
    }
}

/// Ordered `(name, value)` pairs of a struct.
pub type FieldMap = Vec<(&'static str, FieldValue)>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("voter {0:?} is not a 20 byte hex address")]
    InvalidAddress(String),
    #[error("proposal id {0:?} is not a 32 byte hex string")]
    InvalidProposalId(String),
}

/// Maps the vote to the typed fields of the `Vote` struct, in [`VOTE_FIELDS`] order.
pub fn encode_message(vote: &VoteMessage) -> Result<FieldMap, CodecError> {
    let from = parse_address(vote.voter())?;
    let proposal = parse_bytes32(vote.proposal_id())?;

    Ok(vec![
        ("from", FieldValue::Address(from)),
        ("space", FieldValue::String(vote.space().to_owned())),
        ("timestamp", FieldValue::Uint64(vote.timestamp())),
        ("proposal", FieldValue::Bytes32(proposal)),
        ("choice", FieldValue::String(vote.weighted_choice())),
        ("reason", FieldValue::String(String::new())),
        ("app", FieldValue::String(APP_TAG.to_owned())),
        ("metadata", FieldValue::String(EMPTY_METADATA.to_owned())),
    ])
}

/// Encodes the type of a struct as `Name(type1 field1,type2 field2,...)`.
pub fn encode_type(type_name: &str, fields: &[(&str, FieldValue)]) -> String {
    let members = fields
        .iter()
        .map(|(name, value)| format!("{} {name}", value.field_type().as_str()))
        .collect::<Vec<_>>()
        .join(",");
    format!("{type_name}({members})")
}

/// `keccak256(typeHash || encodeData(fields))`
pub fn struct_hash(type_name: &str, fields: &[(&str, FieldValue)]) -> H256 {
    let type_hash = keccak256(encode_type(type_name, fields).as_bytes());

    let mut tokens = Vec::with_capacity(fields.len() + 1);
    tokens.push(Token::FixedBytes(type_hash.to_vec()));
    tokens.extend(fields.iter().map(|(_, value)| value.to_token()));

    H256::from(keccak256(abi::encode(&tokens)))
}

/// Struct hash of the fixed Snapshot domain.
pub fn domain_separator() -> H256 {
    let fields = [
        ("name", FieldValue::String(DOMAIN_NAME.to_owned())),
        ("version", FieldValue::String(DOMAIN_VERSION.to_owned())),
    ];
    struct_hash(DOMAIN_TYPE, &fields)
}

/// The digest to sign: `keccak256(0x19 0x01 || domainSeparator || structHash(vote))`.
pub fn digest(vote: &VoteMessage) -> Result<H256, CodecError> {
    let message_hash = struct_hash(VOTE_TYPE, &encode_message(vote)?);

    let mut payload = Vec::with_capacity(SIGNING_PREFIX.len() + 64);
    payload.extend_from_slice(&SIGNING_PREFIX);
    payload.extend_from_slice(domain_separator().as_bytes());
    payload.extend_from_slice(message_hash.as_bytes());

    let digest = H256::from(keccak256(payload));
    log::debug!("eip712 digest for {vote}: {digest:?}");

    Ok(digest)
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok()
}

fn parse_address(s: &str) -> Result<Address, CodecError> {
    match decode_hex(s) {
        Some(bytes) if bytes.len() == Address::len_bytes() => Ok(Address::from_slice(&bytes)),
        _ => Err(CodecError::InvalidAddress(s.to_owned())),
    }
}

/// Proposal ids are always `0x` prefixed on the hub.
fn parse_bytes32(s: &str) -> Result<[u8; 32], CodecError> {
    s.strip_prefix("0x")
        .and_then(|h| hex::decode(h).ok())
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
        .ok_or_else(|| CodecError::InvalidProposalId(s.to_owned()))
}
