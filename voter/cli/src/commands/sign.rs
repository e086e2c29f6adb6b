// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Sign a vote offline and print what would be sent.

use async_trait::async_trait;
use clap::Args;
use snapshot_voter_identity::VoteSigner;
use snapshot_voter_provider::snapshot::VoteEnvelope;
use snapshot_voter_provider::{Clock, SystemClock};
use snapshot_voter_sdk::{eip712, VoteMessage};
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;

use crate::commands::CommandLineHandler;

pub(crate) struct SignVote;

#[async_trait]
impl CommandLineHandler for SignVote {
    type Arguments = SignVoteArgs;

    async fn handle(arguments: &Self::Arguments) -> anyhow::Result<()> {
        let signer = VoteSigner::new(arguments.address.as_str(), &arguments.private_key)?;
        let timestamp = arguments
            .timestamp
            .unwrap_or_else(|| SystemClock.now());

        let vote = VoteMessage::new(
            signer.address(),
            arguments.space.as_str(),
            timestamp,
            arguments.choice,
            arguments.proposal.as_str(),
        );
        let digest = eip712::digest(&vote)?;
        let signature = signer.sign(&digest);
        let sig = signature.to_hex();

        println!("digest: {digest:?}");
        println!("signature: {sig}");
        println!(
            "{}",
            serde_json::to_string_pretty(&VoteEnvelope::new(&vote, &sig))?
        );

        Ok(())
    }
}

#[derive(Args)]
#[command(about = "Sign a vote without submitting it and print the request body")]
pub(crate) struct SignVoteArgs {
    #[arg(long, env = "VOTER_ADDRESS", help = "The voter address")]
    pub address: String,
    #[arg(
        long,
        env = "VOTER_PRIVATE_KEY",
        hide_env_values = true,
        help = "Hex encoded private key of the voter"
    )]
    pub private_key: String,
    #[arg(long, env = "PROPOSAL_SPACE", help = "The Snapshot space")]
    pub space: String,
    #[arg(long, help = "The 0x prefixed proposal id")]
    pub proposal: String,
    #[arg(long, help = "The 1-based index of the choice")]
    pub choice: NonZeroU32,
    #[arg(long, help = "Unix timestamp of the vote, now when absent")]
    pub timestamp: Option<u64>,
}

impl Debug for SignVoteArgs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignVoteArgs")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .field("space", &self.space)
            .field("proposal", &self.proposal)
            .field("choice", &self.choice)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
