// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! Provides a simple way of reading configuration files.
//!
//! The voter is configured either from a TOML file, deserialized in a type-safe way into a
//! [`Config`] struct, or from environment variables. The private key can always be supplied
//! through the environment so it does not need to live in the file.

use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;
use zeroize::Zeroize;

pub const VOTER_ADDRESS_ENV: &str = "VOTER_ADDRESS";
pub const VOTER_PRIVATE_KEY_ENV: &str = "VOTER_PRIVATE_KEY";
pub const PROPOSAL_SPACE_ENV: &str = "PROPOSAL_SPACE";
pub const PROPOSAL_TITLE_ENV: &str = "PROPOSAL_TITLE";
pub const PROPOSAL_CHOICE_ENV: &str = "PROPOSAL_CHOICE";
pub const SNAPSHOT_HUB_ENV: &str = "SNAPSHOT_HUB_URL";
pub const SNAPSHOT_SEQUENCER_ENV: &str = "SNAPSHOT_SEQUENCER_URL";
pub const VOTE_INTERVAL_ENV: &str = "VOTE_INTERVAL_SECS";

pub const DEFAULT_HUB_URL: &str = "https://hub.snapshot.org/graphql";
pub const DEFAULT_SEQUENCER_URL: &str = "https://seq.snapshot.org/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is not a valid url: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },
    #[error("{0} must be a positive number of seconds")]
    InvalidInterval(&'static str),
    #[error("invalid voter key: {0}")]
    InvalidKey(#[from] snapshot_voter_identity::SignerError),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// The top-level struct representing the config. Calls to [`Config::from_file`] deserialize
/// into this struct.
#[derive(Deserialize, Debug)]
pub struct Config {
    pub voter: Voter,
    pub proposal: ProposalTarget,
    #[serde(default)]
    pub snapshot: SnapshotEndpoints,
    #[serde(default)]
    pub agent: Agent,
}

/// The delegate the votes are cast for.
#[derive(Deserialize, Debug)]
pub struct Voter {
    pub address: String,
    #[serde(default)]
    pub private_key: Option<SecretString>,
}

/// Which proposal to look for and what to vote.
#[derive(Deserialize, Debug, Clone)]
pub struct ProposalTarget {
    /// The governance space, e.g. `cvx.eth`
    pub space: String,
    /// Prefix the proposal title must start with
    pub title: String,
    /// Substring the label of the chosen option must contain
    pub choice: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEndpoints {
    #[serde(default = "default_hub")]
    pub hub: Url,
    #[serde(default = "default_sequencer")]
    pub sequencer: Url,
}

impl Default for SnapshotEndpoints {
    fn default() -> Self {
        Self {
            hub: default_hub(),
            sequencer: default_sequencer(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Agent {
    /// Seconds between two vote cycles. When not set a single cycle is run.
    pub interval_secs: Option<u64>,
}

impl Agent {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}

/// A string holding key material. Wiped on drop and never printed.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Debug for SecretString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

impl Config {
    /// Reads a TOML configuration in the `s` string and returns a [`Config`] struct.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file specified in the `path` and returns a [`Config`] struct.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Config::from_toml_str(&contents)
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let url_or = |name: &'static str, default: fn() -> Url| match lookup(name) {
            Some(s) => Url::parse(&s).map_err(|source| ConfigError::InvalidUrl { name, source }),
            None => Ok(default()),
        };

        let interval_secs = lookup(VOTE_INTERVAL_ENV)
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidInterval(VOTE_INTERVAL_ENV))
            })
            .transpose()?;

        let config = Config {
            voter: Voter {
                address: required(VOTER_ADDRESS_ENV)?,
                private_key: Some(SecretString(required(VOTER_PRIVATE_KEY_ENV)?)),
            },
            proposal: ProposalTarget {
                space: required(PROPOSAL_SPACE_ENV)?,
                title: required(PROPOSAL_TITLE_ENV)?,
                choice: required(PROPOSAL_CHOICE_ENV)?,
            },
            snapshot: SnapshotEndpoints {
                hub: url_or(SNAPSHOT_HUB_ENV, default_hub)?,
                sequencer: url_or(SNAPSHOT_SEQUENCER_ENV, default_sequencer)?,
            },
            agent: Agent { interval_secs },
        };
        config.validate()?;

        Ok(config)
    }

    /// Takes the private key from `lookup` when it is set there, overriding the file value.
    pub fn override_private_key(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(VOTER_PRIVATE_KEY_ENV) {
            self.voter.private_key = Some(SecretString(key));
        }
    }

    /// The voter private key, which must be set by the time the signer is created.
    pub fn private_key(&self) -> Result<&SecretString, ConfigError> {
        self.voter
            .private_key
            .as_ref()
            .ok_or(ConfigError::Missing(VOTER_PRIVATE_KEY_ENV))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (VOTER_ADDRESS_ENV, &self.voter.address),
            (PROPOSAL_SPACE_ENV, &self.proposal.space),
            (PROPOSAL_TITLE_ENV, &self.proposal.title),
            (PROPOSAL_CHOICE_ENV, &self.proposal.choice),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::Missing(*name));
        }

        if self.agent.interval_secs == Some(0) {
            return Err(ConfigError::InvalidInterval(VOTE_INTERVAL_ENV));
        }

        Ok(())
    }
}

fn default_hub() -> Url {
    Url::parse(DEFAULT_HUB_URL).expect("default hub url is valid")
}

fn default_sequencer() -> Url {
    Url::parse(DEFAULT_SEQUENCER_URL).expect("default sequencer url is valid")
}
