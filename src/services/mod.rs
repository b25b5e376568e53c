//! Service layer for business logic
//!
//! Shared between the HTTP API and the CLI.

mod audio_archive;
mod suggestion_service;

pub use audio_archive::AudioArchive;
pub use suggestion_service::*;
