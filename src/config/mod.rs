//! Run configuration: `wikiup.toml` plus CLI overrides.
//!
//! The config file is optional; every value has a CLI flag or a default.
//! Precedence is CLI flag over file value over default, resolved once
//! into a [`Settings`] the commands consume.
//!
//! ```toml
//! # wikiup.toml
//! [site]
//! team = "Amsterdam"          # published under Team:Amsterdam/...
//! year = 2024                 # wiki edition (defaults to current year)
//! prefix = ""                 # extra title prefix below the namespace
//!
//! [auth]
//! username = "..."
//! password = "..."
//!
//! [upload]
//! chunk_size = 1048576        # chunked-upload threshold in bytes
//! strip = false               # drop the pattern directory from titles
//! comment = "wikiup sync"
//! ```

use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::{Cli, UploadArgs};
use crate::wiki::DEFAULT_CHUNK_SIZE;

/// Config file looked up in the working directory when no explicit
/// `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "wikiup.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("cannot parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Root structure of `wikiup.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub upload: UploadSection,
}

/// `[site]` - target namespace.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSection {
    pub team: Option<String>,
    pub year: Option<u16>,
    pub prefix: Option<String>,
}

/// `[auth]` - wiki account credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `[upload]` - publish behavior.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadSection {
    pub chunk_size: Option<u64>,
    pub strip: Option<bool>,
    pub comment: Option<String>,
}

impl Config {
    /// Load the config file. An explicit path must exist; the default
    /// path is used only when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_path(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::parse(&content).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))
    }

    /// Parse TOML content.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Fully-resolved run settings (CLI over file over default).
#[derive(Debug, Clone)]
pub struct Settings {
    pub team: Option<String>,
    pub year: u16,
    pub prefix: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub chunk_size: u64,
    pub strip: bool,
    pub comment: Option<String>,
    pub dry_run: bool,
}

impl Settings {
    /// Merge CLI arguments with config file values.
    pub fn resolve(cli: &Cli, upload: Option<&UploadArgs>, config: &Config) -> Self {
        Self {
            team: cli.team.clone().or_else(|| config.site.team.clone()),
            year: cli
                .year
                .or(config.site.year)
                .unwrap_or_else(current_year),
            prefix: cli.prefix.clone().or_else(|| config.site.prefix.clone()),
            username: cli
                .username
                .clone()
                .or_else(|| config.auth.username.clone()),
            password: cli
                .password
                .clone()
                .or_else(|| config.auth.password.clone()),
            chunk_size: upload
                .and_then(|u| u.chunk_size)
                .or(config.upload.chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            strip: upload.is_some_and(|u| u.strip)
                || config.upload.strip.unwrap_or(false),
            comment: upload
                .and_then(|u| u.comment.clone())
                .or_else(|| config.upload.comment.clone()),
            dry_run: cli.dry_run,
        }
    }
}

/// Current wiki edition year.
fn current_year() -> u16 {
    chrono::Utc::now().year() as u16
}
