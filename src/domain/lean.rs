use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, IntoEnumIterator};

/// 精益七大浪费
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum LeanCategory {
    #[default]
    Motion,
    Waiting,
    Overproduction,
    Defects,
    Overprocessing,
    Inventory,
    Transportation,
}

impl LeanCategory {
    /// All category names, in prompt order
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|c| c.as_str()).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motion => "Motion",
            Self::Waiting => "Waiting",
            Self::Overproduction => "Overproduction",
            Self::Defects => "Defects",
            Self::Overprocessing => "Overprocessing",
            Self::Inventory => "Inventory",
            Self::Transportation => "Transportation",
        }
    }
}

impl std::fmt::Display for LeanCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeanCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Invalid lean category: '{}'. Valid: {}",
                    s,
                    Self::names().join(", ")
                )
            })
    }
}

impl Serialize for LeanCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LeanCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 建议等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum SuggestionLevel {
    /// 简单改进，可直接实施
    JustDoIt,
    /// 需要审批
    #[default]
    NeedsReview,
    /// 安全隐患
    Safety,
}

impl SuggestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JustDoIt => "Just Do It",
            Self::NeedsReview => "Needs Review",
            Self::Safety => "Safety",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|l| l.as_str()).collect()
    }
}

impl std::fmt::Display for SuggestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SuggestionLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "Just Do It" / "just_do_it" / "JustDoIt" 都接受
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "justdoit" => Ok(Self::JustDoIt),
            "needsreview" => Ok(Self::NeedsReview),
            "safety" => Ok(Self::Safety),
            _ => Err(format!(
                "Invalid suggestion level: '{}'. Valid: {}",
                s,
                Self::names().join(", ")
            )),
        }
    }
}

impl Serialize for SuggestionLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SuggestionLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
