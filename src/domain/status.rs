use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// 建议审核状态
///
/// 合法流转：
/// - pending_review → approved / rejected
/// - approved → implemented
///
/// 同状态重复提交视为幂等。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    #[default]
    PendingReview,
    Approved,
    Rejected,
    Implemented,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Implemented => "implemented",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|s| s.as_str()).collect()
    }

    pub fn can_transition_to(&self, next: SuggestionStatus) -> bool {
        use SuggestionStatus::*;
        *self == next
            || matches!(
                (self, next),
                (PendingReview, Approved) | (PendingReview, Rejected) | (Approved, Implemented)
            )
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Implemented)
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SuggestionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid status. Must be one of: {}",
                    Self::names().join(", ")
                )
            })
    }
}
