// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! GraphQL requests sent to the Snapshot hub and the shape of their responses.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use snapshot_voter_sdk::ProposalCandidate;

/// Active proposals of a space whose title contains the given text, newest first.
pub(crate) const PROPOSALS_QUERY: &str = r#"query Proposals($space: String!, $title: String!) {
  proposals(
    where: { space: $space, title_contains: $title, state: "active" },
    orderBy: "created",
    orderDirection: desc
  ) {
    id
    title
    choices
  }
}"#;

/// Votes cast by a voter on a proposal.
pub(crate) const VOTES_QUERY: &str = r#"query Votes($voter: String!, $proposal: String!) {
  votes(where: { voter: $voter, proposal: $proposal }) {
    id
  }
}"#;

#[derive(Serialize, Debug)]
pub(crate) struct GraphQLRequest<V> {
    pub query: &'static str,
    pub variables: V,
}

#[derive(Serialize, Debug)]
pub(crate) struct ProposalsVariables<'a> {
    pub space: &'a str,
    pub title: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct VotesVariables<'a> {
    pub voter: &'a str,
    pub proposal: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Deserialize, Debug)]
struct GraphQLError {
    message: String,
}

impl<T> GraphQLResponse<T> {
    /// The response data, or an error if the hub reported any.
    pub fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let messages = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(anyhow!("hub returned errors: {messages}"));
        }
        self.data.ok_or_else(|| anyhow!("hub response has no data"))
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct ProposalsData {
    pub proposals: Option<Vec<ProposalCandidate>>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct VotesData {
    pub votes: Option<Vec<VoteId>>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct VoteId {
    #[allow(dead_code)]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposals_response() {
        let raw = r#"
        {
            "data": {
                "proposals": [
                    {
                        "id": "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028",
                        "title": "Gauge Weight for Week of 3rd Oct 2024",
                        "choices": ["CRV+cvxCRV", "FRAX+USDC"]
                    }
                ]
            }
        }
        "#;

        let response = serde_json::from_str::<GraphQLResponse<ProposalsData>>(raw).unwrap();
        let proposals = response.into_data().unwrap().proposals.unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].choices[0], "CRV+cvxCRV");
    }

    #[test]
    fn test_errors_response() {
        let raw = r#"
        {
            "data": null,
            "errors": [{"message": "Variable \"$space\" of required type \"String!\" was not provided."}]
        }
        "#;

        let response = serde_json::from_str::<GraphQLResponse<VotesData>>(raw).unwrap();
        let err = response.into_data().unwrap_err();
        assert!(err.to_string().contains("$space"));
    }

    #[test]
    fn test_null_list() {
        let raw = r#"{"data": {"votes": null}}"#;
        let response = serde_json::from_str::<GraphQLResponse<VotesData>>(raw).unwrap();
        assert!(response.into_data().unwrap().votes.is_none());
    }
}
