// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Snapshot hub and sequencer client.

mod queries;
mod submission;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use snapshot_voter_sdk::{ProposalCandidate, VoteMessage};
use url::Url;

use crate::config::SnapshotEndpoints;
use crate::http::JsonHttpClient;
use queries::{
    GraphQLRequest, GraphQLResponse, ProposalsData, ProposalsVariables, VotesData, VotesVariables,
    PROPOSALS_QUERY, VOTES_QUERY,
};

pub use submission::VoteEnvelope;

/// The governance platform as seen by the vote coordinator.
#[async_trait]
pub trait GovernanceClient {
    /// Active proposals of `space` whose title contains `title`, newest first.
    async fn query_active_proposals(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Vec<ProposalCandidate>>;

    /// Whether `voter` already has a vote recorded on `proposal_id`.
    async fn has_voted(&self, voter: &str, proposal_id: &str) -> Result<bool>;

    /// Sends the vote and its `0x` prefixed hex signature for inclusion.
    async fn submit_vote(&self, vote: &VoteMessage, signature: &str) -> Result<()>;
}

/// [`GovernanceClient`] backed by the Snapshot GraphQL hub for reads and the sequencer for
/// writes.
#[derive(Clone, Debug)]
pub struct SnapshotClient {
    client: JsonHttpClient,
    hub: Url,
    sequencer: Url,
}

impl SnapshotClient {
    pub fn new(hub: Url, sequencer: Url) -> Result<Self> {
        Ok(Self {
            client: JsonHttpClient::new()?,
            hub,
            sequencer,
        })
    }

    pub fn from_endpoints(endpoints: &SnapshotEndpoints) -> Result<Self> {
        Self::new(endpoints.hub.clone(), endpoints.sequencer.clone())
    }
}

#[async_trait]
impl GovernanceClient for SnapshotClient {
    async fn query_active_proposals(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Vec<ProposalCandidate>> {
        let request = GraphQLRequest {
            query: PROPOSALS_QUERY,
            variables: ProposalsVariables { space, title },
        };

        let r = self
            .client
            .post::<_, GraphQLResponse<ProposalsData>>(&self.hub, &request)
            .await
            .map_err(|e| anyhow!("failed to fetch proposals: {e:#}"))?;
        let proposals = r.into_data()?.proposals.unwrap_or_default();

        log::debug!(
            "received {} active proposals in space {space} matching {title:?}",
            proposals.len()
        );
        Ok(proposals)
    }

    async fn has_voted(&self, voter: &str, proposal_id: &str) -> Result<bool> {
        let request = GraphQLRequest {
            query: VOTES_QUERY,
            variables: VotesVariables {
                voter,
                proposal: proposal_id,
            },
        };

        let r = self
            .client
            .post::<_, GraphQLResponse<VotesData>>(&self.hub, &request)
            .await
            .map_err(|e| anyhow!("failed to fetch votes: {e:#}"))?;
        let votes = r.into_data()?.votes.unwrap_or_default();

        log::debug!(
            "voter {voter} has {} votes on proposal {proposal_id}",
            votes.len()
        );
        Ok(!votes.is_empty())
    }

    async fn submit_vote(&self, vote: &VoteMessage, signature: &str) -> Result<()> {
        let envelope = VoteEnvelope::new(vote, signature);

        self.client
            .post_discard(&self.sequencer, &envelope)
            .await
            .map_err(|e| anyhow!("failed to send vote: {e:#}"))
    }
}

#[cfg(test)]
mod tests;
