//! Two-level punter categories.

use serde::{Deserialize, Serialize};

const SPORTS_OPTIONS: &[&str] = &["football", "basketball", "tennis", "cricket", "baseball"];
const TRADING_OPTIONS: &[&str] = &["forex", "crypto", "stocks", "commodities", "indices"];

/// The domain a punter publishes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryCategory {
    Sports,
    Trading,
}

impl PrimaryCategory {
    pub const ALL: [PrimaryCategory; 2] = [PrimaryCategory::Sports, PrimaryCategory::Trading];

    /// Specific sports or markets available under this category.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            Self::Sports => SPORTS_OPTIONS,
            Self::Trading => TRADING_OPTIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sports => "sports",
            Self::Trading => "trading",
        }
    }
}

impl std::fmt::Display for PrimaryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrimaryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sports" => Ok(Self::Sports),
            "trading" => Ok(Self::Trading),
            other => Err(format!("Unknown category: {other}")),
        }
    }
}

/// Secondary options for the current primary selection; empty when none.
pub fn secondary_options(primary: Option<PrimaryCategory>) -> &'static [&'static str] {
    primary.map(PrimaryCategory::options).unwrap_or(&[])
}
