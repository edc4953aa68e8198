//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// wikiup - publish web assets to a wiki-style content host
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: wikiup.toml when present)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Do not send anything to the server; synthesize placeholder results
    #[arg(short = 'n', long = "dry", global = true)]
    pub dry_run: bool,

    /// Quietly accept all questions and only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Team name (e.g. Amsterdam); titles are prefixed with Team:<name>
    #[arg(long, global = true)]
    pub team: Option<String>,

    /// Wiki edition year (defaults to the current year)
    #[arg(long, global = true)]
    pub year: Option<u16>,

    /// Extra prefix added before each title, below the team namespace
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Username to log in with
    #[arg(short = 'U', long, global = true)]
    pub username: Option<String>,

    /// Password to log in with
    #[arg(short = 'p', long, global = true)]
    pub password: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Publish assets matching the given patterns
    #[command(visible_alias = "u")]
    Upload {
        /// Glob-like patterns of files/directories to publish
        #[arg(required = true, value_name = "PATTERN")]
        patterns: Vec<String>,

        #[command(flatten)]
        args: UploadArgs,
    },

    /// List remote pages under a title prefix
    #[command(visible_alias = "s")]
    Search {
        #[command(flatten)]
        args: SearchArgs,
    },

    /// Delete remote pages under a title prefix
    #[command(visible_alias = "d")]
    Delete {
        #[command(flatten)]
        args: DeleteArgs,
    },
}

/// Upload command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct UploadArgs {
    /// Remove the pattern directory from destination titles
    #[arg(long)]
    pub strip: bool,

    /// Chunked-upload threshold and chunk size in bytes (default 1 MiB)
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,

    /// Comment attached to every upload
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

/// Search command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Title prefix to search below (resolved into the team namespace)
    pub prefix: String,

    /// Results requested per API page
    #[arg(short, long, default_value_t = crate::wiki::DEFAULT_PAGE_LIMIT)]
    pub limit: u32,

    /// Maximum number of API pages to fetch
    #[arg(long, default_value_t = crate::wiki::DEFAULT_MAX_PAGES)]
    pub max_pages: u32,
}

/// Delete command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Title prefix selecting the pages to delete
    pub prefix: String,

    /// Deletion reason recorded in the page log
    #[arg(short, long)]
    pub reason: Option<String>,
}
