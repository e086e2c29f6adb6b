// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Picks the proposal and choice to vote for out of the active proposals of a space.

use crate::vote::ProposalCandidate;
use std::num::NonZeroU32;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no active proposal with title starting with {title_prefix:?}")]
    NoMatchingProposal { title_prefix: String },
    #[error("proposal {proposal_id} has no choice containing {label:?}")]
    NoMatchingChoice { proposal_id: String, label: String },
}

impl ResolveError {
    /// The proposal that was found, if resolution got that far.
    pub fn proposal_id(&self) -> Option<&str> {
        match self {
            ResolveError::NoMatchingProposal { .. } => None,
            ResolveError::NoMatchingChoice { proposal_id, .. } => Some(proposal_id),
        }
    }
}

/// The proposal to vote on and the 1-based index of the choice to vote for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProposal {
    pub proposal_id: String,
    pub choice: NonZeroU32,
}

/// Resolves the target proposal by title prefix and the target choice by label.
///
/// Candidates are expected newest first. Both lookups are first match and case sensitive, so
/// an ambiguous title resolves to the most recent proposal and an ambiguous label to the
/// first matching choice of that proposal.
#[derive(Debug, Clone)]
pub struct ProposalResolver {
    title_prefix: String,
    choice_label: String,
}

impl ProposalResolver {
    pub fn new(title_prefix: impl Into<String>, choice_label: impl Into<String>) -> Self {
        Self {
            title_prefix: title_prefix.into(),
            choice_label: choice_label.into(),
        }
    }

    pub fn title_prefix(&self) -> &str {
        &self.title_prefix
    }

    pub fn choice_label(&self) -> &str {
        &self.choice_label
    }

    pub fn resolve(
        &self,
        candidates: &[ProposalCandidate],
    ) -> Result<ResolvedProposal, ResolveError> {
        let proposal = candidates
            .iter()
            .find(|p| p.title.starts_with(&self.title_prefix))
            .ok_or_else(|| ResolveError::NoMatchingProposal {
                title_prefix: self.title_prefix.clone(),
            })?;

        let index = proposal
            .choices
            .iter()
            .position(|c| c.contains(&self.choice_label))
            .ok_or_else(|| ResolveError::NoMatchingChoice {
                proposal_id: proposal.id.clone(),
                label: self.choice_label.clone(),
            })?;

        Ok(ResolvedProposal {
            proposal_id: proposal.id.clone(),
            choice: NonZeroU32::MIN.saturating_add(index as u32),
        })
    }
}
