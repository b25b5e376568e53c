//! CLI interface module
//!
//! Management commands that run against the configured database without
//! going through the HTTP server.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::config::get_config;
use crate::errors::KaizenError;
use crate::runtime::lifetime::startup::build_context;
use crate::services::SuggestionService;
use commands::{
    config_generate, list_suggestions, recent_errors, run_check, set_status, show_suggestion,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<KaizenError> for CliError {
    fn from(err: KaizenError) -> Self {
        match err {
            KaizenError::DatabaseConfig(_)
            | KaizenError::DatabaseConnection(_)
            | KaizenError::DatabaseOperation(_) => CliError::StorageError(err.message().to_string()),
            KaizenError::Validation(_) => CliError::ParseError(err.message().to_string()),
            _ => CliError::CommandError(err.message().to_string()),
        }
    }
}

async fn open_service() -> Result<Arc<SuggestionService>, CliError> {
    let config = get_config();
    let context = build_context(&config)
        .await
        .map_err(|e| CliError::StorageError(format!("{:#}", e)))?;
    Ok(context.suggestion_service)
}

/// Run a CLI command from clap-parsed input
///
/// `config_path` 为 `-c` 指定的路径，`check` 用来报告配置文件状态。
pub async fn run_cli_command(cmd: Commands, config_path: Option<&str>) -> Result<(), CliError> {
    match cmd {
        // 这两个命令不需要数据库连接
        Commands::Check => run_check(&get_config(), config_path).await,
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force),

        Commands::List {
            status,
            category,
            limit,
            skip,
            json,
        } => {
            let service = open_service().await?;
            list_suggestions(&service, status, category, limit, skip, json).await
        }
        Commands::Show { id } => show_suggestion(&*open_service().await?, &id).await,
        Commands::SetStatus { id, status } => {
            set_status(&*open_service().await?, &id, &status).await
        }
        Commands::Errors { limit } => recent_errors(&*open_service().await?, limit).await,

        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server runtime".to_string(),
        )),
    }
}
