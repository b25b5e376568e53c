//! CLI mode
//!
//! Delegates to the CLI implementation in `interfaces::cli`.

use crate::cli::Commands;
use crate::interfaces::cli::CliError;
use crate::runtime::lifetime;

pub async fn run_cli(cmd: Commands, config_path: Option<&str>) -> Result<(), CliError> {
    lifetime::startup::install_crypto_provider();
    crate::interfaces::cli::run_cli_command(cmd, config_path).await
}
