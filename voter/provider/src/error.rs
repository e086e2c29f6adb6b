// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
use crate::config::ConfigError;
use snapshot_voter_sdk::eip712::CodecError;
use snapshot_voter_sdk::ResolveError;
use thiserror::Error;

/// Why a vote cycle did not end with a submitted vote.
#[derive(Debug, Error)]
pub enum VoterError {
    /// Bad or missing configuration, the agent cannot start.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Reading proposals or votes from the hub failed. Retried on the next cycle.
    #[error("hub query failed: {0:#}")]
    QueryFailed(anyhow::Error),
    #[error("no active proposal with title starting with {title_prefix:?}")]
    NoMatchingProposal { title_prefix: String },
    #[error("proposal {proposal_id} has no choice containing {label:?}")]
    NoMatchingChoice { proposal_id: String, label: String },
    /// The vote could not be hashed for signing, which points at bad input rather than a
    /// transient failure.
    #[error("cannot sign vote: {0}")]
    Signing(#[from] CodecError),
    /// The sequencer did not accept the vote. Retried on the next cycle.
    #[error("vote submission failed: {0:#}")]
    SubmitFailed(anyhow::Error),
    #[error("vote cycle cancelled")]
    Cancelled,
}

impl VoterError {
    /// Steady state outcomes that need no operator attention.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            VoterError::NoMatchingProposal { .. }
                | VoterError::NoMatchingChoice { .. }
                | VoterError::Cancelled
        )
    }

    /// Errors the agent cannot recover from by running another cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VoterError::Config(_))
    }
}

impl From<ResolveError> for VoterError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NoMatchingProposal { title_prefix } => {
                VoterError::NoMatchingProposal { title_prefix }
            }
            ResolveError::NoMatchingChoice { proposal_id, label } => {
                VoterError::NoMatchingChoice { proposal_id, label }
            }
        }
    }
}
