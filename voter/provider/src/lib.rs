// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Watches a Snapshot space for a target proposal and submits a signed vote on it once.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod snapshot;

pub use coordinator::{Clock, SystemClock, VoteCoordinator, VoteState};
pub use error::VoterError;
pub use snapshot::{GovernanceClient, SnapshotClient};
