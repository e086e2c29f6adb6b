// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! The module that contains all the CLI commands.

mod run;
mod sign;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use std::fmt::Debug;
use std::path::Path;

use run::{RunVoter, RunVoterArgs};
use sign::{SignVote, SignVoteArgs};

/// The trait that represents the abstraction of a command line handler. To implement a new
/// command line operation, implement this trait and register it in [`Commands`].
///
/// Commands are constructed from scratch for every invocation, state is built inside `handle`.
#[async_trait]
pub(crate) trait CommandLineHandler {
    /// Parsed command line arguments of the command.
    type Arguments: Debug + Args;

    async fn handle(arguments: &Self::Arguments) -> anyhow::Result<()>;
}

/// The collection of all subcommands to be called, see clap's documentation for usage.
#[derive(Debug, Subcommand)]
enum Commands {
    Run(RunVoterArgs),
    Sign(SignVoteArgs),
}

/// The overall command line struct to be used by `clap`.
#[derive(Debug, Parser)]
#[command(
    name = "snapshot-voter",
    about = "Votes once on the current Snapshot proposal matching a title",
    version
)]
#[command(propagate_version = true)]
struct SnapshotVoterCommands {
    #[command(subcommand)]
    command: Commands,
}

/// Environment file read from the working directory before arguments are parsed.
const ENV_FILE: &str = ".env";

/// Parses the command line and runs the selected command.
pub async fn cli() -> anyhow::Result<()> {
    load_env_file(Path::new(ENV_FILE));
    let args = SnapshotVoterCommands::parse();
    log::debug!("running command: {:?}", args.command);

    match &args.command {
        Commands::Run(args) => RunVoter::handle(args).await,
        Commands::Sign(args) => SignVote::handle(args).await,
    }
}

/// Exports the variables of `path` into the process environment. Variables that are already
/// set keep their value, a missing file is not an error.
fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => log::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("cannot load environment from {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_load_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SNAPSHOT_VOTER_TEST_SPACE=cvx.eth").unwrap();
        writeln!(file, "SNAPSHOT_VOTER_TEST_TITLE=from file").unwrap();
        std::env::set_var("SNAPSHOT_VOTER_TEST_TITLE", "from env");

        load_env_file(file.path());

        assert_eq!(std::env::var("SNAPSHOT_VOTER_TEST_SPACE").unwrap(), "cvx.eth");
        assert_eq!(
            std::env::var("SNAPSHOT_VOTER_TEST_TITLE").unwrap(),
            "from env"
        );
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        load_env_file(&dir.path().join(".env"));
    }

    #[test]
    fn test_cli_definition() {
        SnapshotVoterCommands::command().debug_assert();
    }

    #[test]
    fn test_parse_sign() {
        let args = SnapshotVoterCommands::try_parse_from([
            "snapshot-voter",
            "sign",
            "--address",
            "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a",
            "--private-key",
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
            "--space",
            "cvx.eth",
            "--proposal",
            "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028",
            "--choice",
            "3",
            "--timestamp",
            "1727621658",
        ])
        .unwrap();

        match args.command {
            Commands::Sign(sign) => {
                assert_eq!(sign.choice.get(), 3);
                assert_eq!(sign.timestamp, Some(1727621658));
                assert!(!format!("{sign:?}").contains("4c0883a6"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_zero_choice_rejected() {
        let r = SnapshotVoterCommands::try_parse_from([
            "snapshot-voter",
            "sign",
            "--address",
            "0x00",
            "--private-key",
            "0x00",
            "--space",
            "cvx.eth",
            "--proposal",
            "0x00",
            "--choice",
            "0",
        ]);
        assert!(r.is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let r = SnapshotVoterCommands::try_parse_from(["snapshot-voter", "run", "--interval", "0"]);
        assert!(r.is_err());
    }
}
