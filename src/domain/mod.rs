//! Kaizen suggestion domain types
//!
//! - `lean`: lean waste categories and suggestion levels
//! - `status`: review status lifecycle
//! - `suggestion`: stored suggestion record, submission metadata, AI analysis

pub mod lean;
pub mod status;
pub mod suggestion;

pub use lean::{LeanCategory, SuggestionLevel};
pub use status::SuggestionStatus;
pub use suggestion::{
    Analysis, KaizenSuggestion, SUMMARY_FALLBACK_CHARS, SubmissionMetadata, generate_job_id,
};
