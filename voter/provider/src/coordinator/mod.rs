// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Vote coordinator
//!
//! One cycle resolves the target proposal, checks whether a vote is still owed, signs and
//! submits it. Deduplication happens in two layers: the in memory [`VoteState`] skips a
//! proposal this process already voted on, the hub's vote records are queried before every
//! signature and are what makes a vote at most once across restarts or concurrent agents.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use snapshot_voter_identity::VoteSigner;
use snapshot_voter_sdk::{eip712, ProposalResolver, VoteMessage};
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::error::VoterError;
use crate::snapshot::GovernanceClient;

/// What the coordinator remembers between cycles. Lost on restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteState {
    /// The proposal this process last submitted a vote for
    pub last_proposal_id: Option<String>,
    /// Unix seconds of the last vote seen or sent
    pub last_vote_at: Option<u64>,
}

/// Source of the unix timestamps put into votes.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Drives vote cycles for one voter and one target proposal. Cycles must not overlap, which
/// `&mut self` enforces.
pub struct VoteCoordinator<G> {
    client: G,
    signer: VoteSigner,
    space: String,
    resolver: ProposalResolver,
    state: VoteState,
    clock: Box<dyn Clock>,
}

impl<G: GovernanceClient + Send + Sync> VoteCoordinator<G> {
    pub fn new(
        client: G,
        signer: VoteSigner,
        space: impl Into<String>,
        resolver: ProposalResolver,
    ) -> Self {
        Self {
            client,
            signer,
            space: space.into(),
            resolver,
            state: VoteState::default(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &VoteState {
        &self.state
    }

    pub fn client(&self) -> &G {
        &self.client
    }

    /// Runs a cycle now and then one every `interval` until `cancel` fires. Without an
    /// interval a single cycle is run. Failed cycles are logged and never stop the loop.
    pub async fn run(
        mut self,
        interval: Option<Duration>,
        cancel: CancellationToken,
    ) -> VoteState {
        loop {
            // the outcome is already logged by `run_cycle`
            let _ = self.run_cycle(&cancel).await;

            let Some(interval) = interval else {
                break;
            };

            select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        log::info!("vote coordinator for {} stopped", self.signer.address());
        self.state
    }

    /// Runs one full cycle. Returns whether a vote was submitted.
    ///
    /// The state is only touched once the cycle reached a conclusion: a cancelled or failed
    /// cycle leaves it as it was, so the next cycle starts over.
    pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> Result<bool, VoterError> {
        let result = self.try_run_cycle(cancel).await;

        match &result {
            Ok(true) => {}
            Ok(false) => log::debug!("no vote needed this cycle"),
            Err(e) if e.is_expected() => log::info!("no vote this cycle: {e}"),
            Err(e @ VoterError::Signing(_)) => log::error!("vote cycle aborted: {e}"),
            Err(e) => log::warn!("vote cycle aborted: {e}"),
        }

        result
    }

    async fn try_run_cycle(&mut self, cancel: &CancellationToken) -> Result<bool, VoterError> {
        let candidates = cancellable(
            cancel,
            self.client
                .query_active_proposals(&self.space, self.resolver.title_prefix()),
        )
        .await?
        .map_err(VoterError::QueryFailed)?;

        let target = self.resolver.resolve(&candidates)?;
        log::debug!(
            "resolved proposal {} with choice {}",
            target.proposal_id,
            target.choice
        );

        if self.state.last_proposal_id.as_deref() == Some(target.proposal_id.as_str()) {
            log::debug!("already voted on proposal {} in this run", target.proposal_id);
            return Ok(false);
        }

        let voted = cancellable(
            cancel,
            self.client
                .has_voted(self.signer.address(), &target.proposal_id),
        )
        .await?
        .map_err(VoterError::QueryFailed)?;

        if voted {
            log::info!(
                "{} already voted on proposal {}",
                self.signer.address(),
                target.proposal_id
            );
            self.state.last_vote_at = Some(self.clock.now());
            return Ok(false);
        }

        let vote = VoteMessage::new(
            self.signer.address(),
            self.space.as_str(),
            self.clock.now(),
            target.choice,
            target.proposal_id.as_str(),
        );
        let digest = eip712::digest(&vote)?;
        let signature = self.signer.sign(&digest);
        log::debug!("signed {vote} with {signature}");

        cancellable(cancel, self.client.submit_vote(&vote, &signature.to_hex()))
            .await?
            .map_err(VoterError::SubmitFailed)?;

        log::info!(
            "vote sent on proposal {} for choice {}",
            target.proposal_id,
            target.choice
        );

        self.state = VoteState {
            last_proposal_id: Some(target.proposal_id),
            last_vote_at: Some(self.clock.now()),
        };

        Ok(true)
    }
}

/// Awaits `fut` unless `cancel` fires first. An already cancelled token wins without polling
/// `fut`.
async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, VoterError> {
    select! {
        biased;
        _ = cancel.cancelled() => Err(VoterError::Cancelled),
        r = fut => Ok(r),
    }
}
