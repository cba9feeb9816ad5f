//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// nconfig - resolve this machine's environment and keep the active
/// configuration in sync with it
#[derive(Parser, Debug)]
#[command(name = "nconfig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to start the root search from (defaults to the
    /// current directory)
    #[arg(long, global = true)]
    pub start_dir: Option<String>,

    /// Fall back to this environment instead of the definitions'
    /// "default" entry
    #[arg(short, long, global = true)]
    pub default: Option<String>,

    /// Path of the active configuration store file
    #[arg(long, global = true, default_value = "active.toml")]
    pub active: String,

    /// The command to run; with none, prints the resolved environment
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the value of a setting
    Setting {
        /// Setting key
        key: String,
    },

    /// Print the value of a connection string
    Connection {
        /// Connection-string name
        key: String,
    },

    /// Validate every environment against the default
    Validate,

    /// List this machine's identity candidates in priority order
    Candidates,
}
