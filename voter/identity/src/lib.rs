// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Voter key management and recoverable secp256k1 signatures over vote digests.

mod signature;

use ethers::types::{Address, H256};
use libsecp256k1::{Message, PublicKey, SecretKey};
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use zeroize::Zeroizing;

pub use crate::signature::{normalize_recovery_id, RecoverableSignature, SIGNATURE_LEN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("private key is not valid hex")]
    InvalidKeyEncoding,
    #[error("private key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("private key is not a valid secp256k1 secret")]
    InvalidKey,
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

/// Holds the voter private key and signs vote digests with it.
///
/// The address is the account the key is configured for. It is what the hub is asked about
/// when checking for an existing vote and it is never checked against the key here.
pub struct VoteSigner {
    address: String,
    secret_key: SecretKey,
}

impl VoteSigner {
    /// Creates a signer from a hex encoded private key, with or without `0x` prefix.
    pub fn new(address: impl Into<String>, private_key: &str) -> Result<Self, SignerError> {
        let private_key = private_key.trim();
        let bytes = Zeroizing::new(
            hex::decode(private_key.strip_prefix("0x").unwrap_or(private_key))
                .map_err(|_| SignerError::InvalidKeyEncoding)?,
        );
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKeyLength(bytes.len()));
        }

        let secret_key = SecretKey::parse_slice(&bytes).map_err(|_| SignerError::InvalidKey)?;

        Ok(Self {
            address: address.into(),
            secret_key,
        })
    }

    /// The configured voter address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The address derived from the private key. Votes from a signer whose configured
    /// address differs from this one are rejected by the sequencer.
    pub fn key_address(&self) -> Address {
        signature::public_key_address(&PublicKey::from_secret_key(&self.secret_key))
    }

    /// Signs the 32 byte digest. The returned signature is `r || s || v` with `v` already
    /// shifted to 27 or 28.
    pub fn sign(&self, digest: &H256) -> RecoverableSignature {
        let message = Message::parse(digest.as_fixed_bytes());
        let (signature, recovery_id) = libsecp256k1::sign(&message, &self.secret_key);
        log::debug!(
            "signed digest {digest:?} with raw recovery id {}",
            recovery_id.serialize()
        );
        RecoverableSignature::new(signature.serialize(), recovery_id.serialize())
    }
}

impl Debug for VoteSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteSigner")
            .field("address", &self.address)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
