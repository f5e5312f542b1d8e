//! User preference entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Converts the theme to its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parses a theme from its wire/storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Per-user display preferences, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
    /// Owner's email address.
    pub email: String,
    /// Selected theme.
    pub theme: Theme,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserPreference {
    /// Creates a preference record.
    pub fn new(email: impl Into<String>, theme: Theme) -> Self {
        Self {
            email: email.into(),
            theme,
            updated_at: Utc::now(),
        }
    }
}
