// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! The request body the sequencer expects for a signed vote.

use serde::Serialize;
use snapshot_voter_sdk::eip712::VOTE_FIELDS;
use snapshot_voter_sdk::vote::{APP_TAG, DOMAIN_NAME, DOMAIN_VERSION, EMPTY_METADATA};
use snapshot_voter_sdk::VoteMessage;

/// A signed vote together with the typed data it was signed over.
#[derive(Serialize, Debug)]
pub struct VoteEnvelope<'a> {
    address: &'a str,
    sig: &'a str,
    data: TypedVote<'a>,
}

#[derive(Serialize, Debug)]
struct TypedVote<'a> {
    domain: Domain,
    types: Types,
    message: Message<'a>,
}

#[derive(Serialize, Debug)]
struct Domain {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize, Debug)]
struct Types {
    #[serde(rename = "Vote")]
    vote: Vec<TypeMember>,
}

#[derive(Serialize, Debug)]
struct TypeMember {
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Mirrors the signed fields one to one.
#[derive(Serialize, Debug)]
struct Message<'a> {
    from: &'a str,
    space: &'a str,
    timestamp: u64,
    proposal: &'a str,
    choice: String,
    reason: &'static str,
    app: &'static str,
    metadata: &'static str,
}

impl<'a> VoteEnvelope<'a> {
    pub fn new(vote: &'a VoteMessage, signature: &'a str) -> Self {
        Self {
            address: vote.voter(),
            sig: signature,
            data: TypedVote {
                domain: Domain {
                    name: DOMAIN_NAME,
                    version: DOMAIN_VERSION,
                },
                types: Types {
                    vote: VOTE_FIELDS
                        .iter()
                        .map(|&(name, kind)| TypeMember {
                            name,
                            kind: kind.as_str(),
                        })
                        .collect(),
                },
                message: Message {
                    from: vote.voter(),
                    space: vote.space(),
                    timestamp: vote.timestamp(),
                    proposal: vote.proposal_id(),
                    choice: vote.weighted_choice(),
                    reason: "",
                    app: APP_TAG,
                    metadata: EMPTY_METADATA,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::num::NonZeroU32;

    #[test]
    fn test_envelope_shape() {
        let vote = VoteMessage::new(
            "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a",
            "cvx.eth",
            1727621658,
            NonZeroU32::new(477).unwrap(),
            "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028",
        );

        let value = serde_json::to_value(VoteEnvelope::new(&vote, "0xabcd")).unwrap();
        assert_eq!(
            value,
            json!({
                "address": "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a",
                "sig": "0xabcd",
                "data": {
                    "domain": {"name": "snapshot", "version": "0.1.4"},
                    "types": {
                        "Vote": [
                            {"name": "from", "type": "address"},
                            {"name": "space", "type": "string"},
                            {"name": "timestamp", "type": "uint64"},
                            {"name": "proposal", "type": "bytes32"},
                            {"name": "choice", "type": "string"},
                            {"name": "reason", "type": "string"},
                            {"name": "app", "type": "string"},
                            {"name": "metadata", "type": "string"}
                        ]
                    },
                    "message": {
                        "from": "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a",
                        "space": "cvx.eth",
                        "timestamp": 1727621658,
                        "proposal": "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028",
                        "choice": "{\"477\":1}",
                        "reason": "",
                        "app": "snapshot-voter",
                        "metadata": "{}"
                    }
                }
            })
        );
    }
}
