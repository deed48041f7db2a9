//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Edit a cluster > server > bucket topology through replayable editor events
#[derive(Parser, Debug)]
#[command(name = "topotree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an event script against the editor
    Replay {
        /// Event script ("-" reads stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Snapshot (JSON) to preload before replaying
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        preload: Option<PathBuf>,
        /// Print the final topology as JSON instead of a tree
        #[arg(long)]
        json: bool,
        /// Do not print render commands
        #[arg(short, long)]
        quiet: bool,
        /// Fail if any event was rejected
        #[arg(long)]
        strict: bool,
    },

    /// Validate a snapshot and show it as a tree
    Check {
        /// Snapshot (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
