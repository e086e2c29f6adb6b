// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
use crate::SignerError;
use ethers::types::{Address, H256};
use ethers::utils::keccak256;
use libsecp256k1::{Message, PublicKey, RecoveryId, Signature};
use std::fmt::{Debug, Display, Formatter};

/// Length of `r || s || v`
pub const SIGNATURE_LEN: usize = 65;

/// Offset ethereum verifiers expect on top of the raw recovery id.
const RECOVERY_ID_OFFSET: u8 = 27;

/// Shifts a raw recovery id (0 or 1) into the 27/28 form. Values already in that form are
/// returned as they are.
pub fn normalize_recovery_id(v: u8) -> u8 {
    match v {
        27 | 28 => v,
        v => v.wrapping_add(RECOVERY_ID_OFFSET),
    }
}

/// A 65 byte `r || s || v` signature with `v` in {27, 28}.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LEN]);

impl RecoverableSignature {
    pub(crate) fn new(rs: [u8; 64], recovery_id: u8) -> Self {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&rs);
        bytes[64] = normalize_recovery_id(recovery_id);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// `0x` prefixed hex, the form the sequencer expects.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Recovers the address that produced this signature over `digest`.
    pub fn recover(&self, digest: &H256) -> Result<Address, SignerError> {
        let signature = Signature::parse_standard_slice(&self.0[..64])
            .map_err(|e| SignerError::MalformedSignature(format!("{e:?}")))?;
        let recovery_id = RecoveryId::parse_rpc(self.v())
            .map_err(|e| SignerError::MalformedSignature(format!("{e:?}")))?;

        let public_key = libsecp256k1::recover(
            &Message::parse(digest.as_fixed_bytes()),
            &signature,
            &recovery_id,
        )
        .map_err(|e| SignerError::MalformedSignature(format!("{e:?}")))?;

        Ok(public_key_address(&public_key))
    }
}

pub(crate) fn public_key_address(public_key: &PublicKey) -> Address {
    // drop the 0x04 uncompressed point tag before hashing
    let hash = keccak256(&public_key.serialize()[1..]);
    Address::from_slice(&hash[12..])
}

impl Display for RecoverableSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Debug for RecoverableSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecoverableSignature({})", self.to_hex())
    }
}
