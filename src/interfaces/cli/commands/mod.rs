//! CLI command implementations

mod check;
mod config_gen;
mod suggestions;

pub use check::run_check;
pub use config_gen::config_generate;
pub use suggestions::{list_suggestions, recent_errors, set_status, show_suggestion};
