//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Kaizen Voice - capture, classify and review shop-floor improvement ideas
#[derive(Parser)]
#[command(name = "kaizen-voice")]
#[command(version)]
#[command(about = "Voice-note capture backend for kaizen improvement ideas", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// List stored suggestions, newest first
    List {
        /// Filter by status (pending_review, approved, rejected, implemented)
        #[arg(long)]
        status: Option<String>,

        /// Filter by lean category (e.g. Motion, Waiting)
        #[arg(long)]
        category: Option<String>,

        /// Maximum number of suggestions to show
        #[arg(long)]
        limit: Option<u64>,

        /// Number of suggestions to skip
        #[arg(long)]
        skip: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single suggestion
    Show {
        /// Suggestion id
        id: String,
    },

    /// Change the review status of a suggestion
    SetStatus {
        /// Suggestion id
        id: String,

        /// New status (pending_review, approved, rejected, implemented)
        status: String,
    },

    /// Show the most recent server errors
    Errors {
        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },

    /// Check configuration, credentials, database URL and archive directory
    Check,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 没有子命令时默认启动服务器
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
