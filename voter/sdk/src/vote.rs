// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;

/// Name of the typed-data domain Snapshot votes are signed against.
pub const DOMAIN_NAME: &str = "snapshot";
/// Version of the typed-data domain Snapshot votes are signed against.
pub const DOMAIN_VERSION: &str = "0.1.4";
/// Tag identifying this agent in the `app` field of every vote.
pub const APP_TAG: &str = "snapshot-voter";
/// The `metadata` field is always an empty json object.
pub const EMPTY_METADATA: &str = "{}";

/// A single vote on a Snapshot proposal. Immutable once constructed, the timestamp is the one
/// captured when the vote was created for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteMessage {
    voter: String,
    space: String,
    timestamp: u64,
    choice: NonZeroU32,
    proposal_id: String,
}

impl VoteMessage {
    pub fn new(
        voter: impl Into<String>,
        space: impl Into<String>,
        timestamp: u64,
        choice: NonZeroU32,
        proposal_id: impl Into<String>,
    ) -> Self {
        Self {
            voter: voter.into(),
            space: space.into(),
            timestamp,
            choice,
            proposal_id: proposal_id.into(),
        }
    }

    /// The account casting the vote
    pub fn voter(&self) -> &str {
        &self.voter
    }

    /// The governance space the proposal lives in
    pub fn space(&self) -> &str {
        &self.space
    }

    /// Unix seconds at which the vote was created
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// 1-based index into the proposal's choices
    pub fn choice(&self) -> NonZeroU32 {
        self.choice
    }

    pub fn proposal_id(&self) -> &str {
        &self.proposal_id
    }

    /// The `choice` field as it is signed and submitted: a json map from the choice index to
    /// a vote weight of 1, i.e. `{"3":1}` for the third choice.
    pub fn weighted_choice(&self) -> String {
        format!("{{\"{}\":1}}", self.choice)
    }
}

impl Display for VoteMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vote(voter: {}, space: {}, proposal: {}, choice: {}, timestamp: {})",
            self.voter, self.space, self.proposal_id, self.choice, self.timestamp
        )
    }
}

/// A proposal as returned by the hub. Only the fields needed to pick a vote are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProposalCandidate {
    pub id: String,
    pub title: String,
    /// Choice labels in hub order
    pub choices: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_choice() {
        let vote = VoteMessage::new(
            "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a",
            "cvx.eth",
            1727621658,
            NonZeroU32::new(3).unwrap(),
            "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028",
        );
        assert_eq!(vote.weighted_choice(), r#"{"3":1}"#);
    }

    #[test]
    fn test_candidate_deserialization() {
        let raw = r#"
        {
            "id": "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028",
            "title": "Gauge Weight for Week of 3rd Oct 2024",
            "choices": ["CRV+cvxCRV", "FRAX+USDC"]
        }
        "#;

        let candidate = serde_json::from_str::<ProposalCandidate>(raw).unwrap();
        assert_eq!(candidate.title, "Gauge Weight for Week of 3rd Oct 2024");
        assert_eq!(candidate.choices.len(), 2);
        assert_eq!(candidate.choices[1], "FRAX+USDC");
    }
}
