pub mod error_log;
pub mod kaizen_suggestion;

pub use error_log::Entity as ErrorLogEntity;
pub use kaizen_suggestion::Entity as KaizenSuggestionEntity;
