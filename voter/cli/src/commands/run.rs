// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Run the voting agent.

use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use ethers::types::Address;
use snapshot_voter_identity::VoteSigner;
use snapshot_voter_provider::config::{Config, ConfigError};
use snapshot_voter_provider::{SnapshotClient, VoteCoordinator, VoterError};
use snapshot_voter_sdk::ProposalResolver;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::commands::CommandLineHandler;

pub(crate) struct RunVoter;

#[async_trait]
impl CommandLineHandler for RunVoter {
    type Arguments = RunVoterArgs;

    async fn handle(arguments: &Self::Arguments) -> anyhow::Result<()> {
        let config = load_config(arguments)?;
        let interval = arguments
            .interval
            .map(Duration::from_secs)
            .or_else(|| config.agent.interval());

        let private_key = config.private_key().map_err(VoterError::Config)?;
        let signer = VoteSigner::new(config.voter.address.as_str(), private_key.expose())
            .map_err(|e| VoterError::Config(ConfigError::InvalidKey(e)))?;

        let key_address = signer.key_address();
        if !is_key_address(signer.address(), &key_address) {
            log::warn!(
                "configured voter {} does not match the private key address {key_address:?}, votes will be rejected",
                signer.address()
            );
        }

        let client = SnapshotClient::from_endpoints(&config.snapshot)?;
        let resolver = ProposalResolver::new(
            config.proposal.title.as_str(),
            config.proposal.choice.as_str(),
        );
        let coordinator =
            VoteCoordinator::new(client, signer, config.proposal.space.as_str(), resolver);

        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

        match interval {
            Some(i) => log::info!(
                "voting in space {} every {}s on proposals titled {:?}",
                config.proposal.space,
                i.as_secs(),
                config.proposal.title
            ),
            None => log::info!(
                "voting once in space {} on proposals titled {:?}",
                config.proposal.space,
                config.proposal.title
            ),
        }

        let state = coordinator.run(interval, cancel).await;
        log::info!("final vote state: {state:?}");

        Ok(())
    }
}

fn load_config(arguments: &RunVoterArgs) -> anyhow::Result<Config> {
    match &arguments.config {
        Some(path) => {
            let mut config = Config::from_file(path)
                .map_err(VoterError::Config)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.override_private_key(|name| std::env::var(name).ok());
            Ok(config)
        }
        None => Config::from_env()
            .map_err(VoterError::Config)
            .context("failed to load config from the environment"),
    }
}

/// Whether the configured voter address is `key_address`, with or without `0x` prefix and in
/// any letter case.
fn is_key_address(configured: &str, key_address: &Address) -> bool {
    let configured = configured.trim();
    let configured = configured.strip_prefix("0x").unwrap_or(configured);
    configured.eq_ignore_ascii_case(&hex::encode(key_address.as_bytes()))
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("received interrupt, stopping after the current step");
            cancel.cancel();
        }
        Err(e) => log::error!("cannot listen for interrupts: {e}"),
    }
}

#[derive(Debug, Args)]
#[command(about = "Watch the configured space and vote on the target proposal")]
pub(crate) struct RunVoterArgs {
    #[arg(
        long,
        short,
        env = "SNAPSHOT_VOTER_CONFIG",
        help = "TOML config file, the environment is read when absent"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        short,
        env = "VOTE_INTERVAL_SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between vote cycles, a single cycle runs when absent"
    )]
    pub interval: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_address_match() {
        let key_address: Address = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
            .parse()
            .unwrap();

        assert!(is_key_address(
            "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23",
            &key_address
        ));
        assert!(is_key_address(
            "2c7536e3605d9c16a7a3d7b1898e529396a65c23",
            &key_address
        ));
        assert!(is_key_address(
            "0x2C7536E3605D9C16a7a3D7b1898e529396a65c23",
            &key_address
        ));
        assert!(!is_key_address(
            "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a",
            &key_address
        ));
        assert!(!is_key_address("0x2c7536e3", &key_address));
    }
}
