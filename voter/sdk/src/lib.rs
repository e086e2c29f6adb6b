// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Snapshot voter common types and utils

pub mod eip712;
pub mod resolver;
pub mod vote;

pub use crate::resolver::{ProposalResolver, ResolveError, ResolvedProposal};
pub use crate::vote::{ProposalCandidate, VoteMessage};
