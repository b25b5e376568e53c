use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" in the current
/// directory). If the file doesn't exist, uses in-memory defaults.
/// Subsequent calls are no-ops.
///
/// # Examples
/// ```no_run
/// use kaizen_voice::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Initialize the global configuration with an explicit value
///
/// Returns `false` if the configuration was already initialized; in that
/// case the existing value is replaced.
pub fn init_config_with(config: StaticConfig) -> bool {
    match CONFIG.get() {
        Some(existing) => {
            existing.store(Arc::new(config));
            false
        }
        None => {
            let swap = ArcSwap::from_pointee(config);
            CONFIG.set(swap).is_ok()
        }
    }
}
