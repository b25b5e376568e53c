//! Deployment preflight

use std::path::Path;

use colored::Colorize;

use crate::config::{DEFAULT_CONFIG_PATH, StaticConfig};
use crate::interfaces::cli::CliError;
use crate::storage::backend::infer_backend_from_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLevel {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckItem {
    pub name: &'static str,
    pub level: CheckLevel,
    pub detail: String,
}

impl CheckItem {
    fn new(name: &'static str, level: CheckLevel, detail: impl Into<String>) -> Self {
        Self {
            name,
            level,
            detail: detail.into(),
        }
    }

    fn print(&self) {
        let mark = match self.level {
            CheckLevel::Ok => "✓".bold().green(),
            CheckLevel::Warn => "⚠".bold().yellow(),
            CheckLevel::Fail => "✗".bold().red(),
        };
        println!("  {} {:<22} {}", mark, self.name, self.detail);
    }
}

/// 收集检查项，不打印
pub fn collect_checks(config: &StaticConfig, config_path: Option<&str>) -> Vec<CheckItem> {
    let mut items = Vec::new();

    let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
    items.push(if Path::new(path).is_file() {
        CheckItem::new("config file", CheckLevel::Ok, path)
    } else if config_path.is_some() {
        CheckItem::new("config file", CheckLevel::Fail, format!("{} not found", path))
    } else {
        CheckItem::new(
            "config file",
            CheckLevel::Warn,
            format!("{} not found, using defaults and environment", path),
        )
    });

    items.push(if config.transcription.api_key.trim().is_empty() {
        CheckItem::new(
            "transcription api key",
            CheckLevel::Fail,
            "not set (transcription.api_key or OPENAI_API_KEY)",
        )
    } else {
        CheckItem::new("transcription api key", CheckLevel::Ok, "set")
    });

    items.push(if config.classifier.api_key.trim().is_empty() {
        CheckItem::new(
            "classifier api key",
            CheckLevel::Warn,
            "not set, every suggestion will need manual review",
        )
    } else {
        CheckItem::new("classifier api key", CheckLevel::Ok, "set")
    });

    items.push(match infer_backend_from_url(&config.database.database_url) {
        Ok(backend) => CheckItem::new("database url", CheckLevel::Ok, backend),
        Err(e) => CheckItem::new("database url", CheckLevel::Fail, e.message().to_string()),
    });

    items.push(if !config.archive.enabled {
        CheckItem::new("audio archive", CheckLevel::Warn, "disabled")
    } else {
        let dir = Path::new(&config.archive.directory);
        if dir.is_dir() {
            CheckItem::new("audio archive", CheckLevel::Ok, dir.display().to_string())
        } else {
            match std::fs::create_dir_all(dir) {
                Ok(()) => CheckItem::new(
                    "audio archive",
                    CheckLevel::Ok,
                    format!("{} (created)", dir.display()),
                ),
                Err(e) => CheckItem::new(
                    "audio archive",
                    CheckLevel::Fail,
                    format!("{}: {}", dir.display(), e),
                ),
            }
        }
    });

    items
}

pub async fn run_check(config: &StaticConfig, config_path: Option<&str>) -> Result<(), CliError> {
    println!("{}", "Preflight check".bold().green());

    let items = collect_checks(config, config_path);
    for item in &items {
        item.print();
    }

    let failed = items
        .iter()
        .filter(|item| item.level == CheckLevel::Fail)
        .count();
    if failed > 0 {
        return Err(CliError::CommandError(format!(
            "{} preflight check(s) failed",
            failed
        )));
    }

    println!("{} Ready to serve", "✓".bold().green());
    Ok(())
}
