use clap::Parser;
use tracing::error;

use kaizen_voice::cli::{Cli, Commands};
use kaizen_voice::config::{LoggingConfig, get_config, init_config};
use kaizen_voice::runtime::modes;
use kaizen_voice::system::logging::init_logging;

#[actix_web::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    init_config(cli.config.as_deref());
    let config = get_config();
    let command = cli.command_or_default();

    match command {
        Commands::Serve => {
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("Failed to initialize logging: {:#}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server().await {
                error!("Server error: {:#}", e);
                eprintln!("{:#}", e);
                std::process::exit(1);
            }
        }
        cmd => {
            // CLI 只输出警告以上的日志，避免干扰命令输出
            let cli_logging = LoggingConfig {
                level: "warn".to_string(),
                file: None,
                ..config.logging.clone()
            };
            let _guard = init_logging(&cli_logging).ok();

            if let Err(e) = modes::run_cli(cmd, cli.config.as_deref()).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }
}
