use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of activity for a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
}

/// A user's full contribution calendar, ordered by date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserContributions {
    pub username: String,
    pub total_contributions: u32,
    pub days: Vec<ContributionDay>,
}

/// A calendar day combined across every user that reported it.
///
/// `per_user` only carries users with a non-zero count; a missing key means 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDay {
    pub date: NaiveDate,
    pub total_count: u32,
    pub per_user: BTreeMap<String, u32>,
}

impl MergedDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_count: 0,
            per_user: BTreeMap::new(),
        }
    }

    pub fn count_for(&self, username: &str) -> u32 {
        self.per_user.get(username).copied().unwrap_or(0)
    }
}

/// How several calendars are blended into one colour per cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MergeMode {
    #[default]
    Sum,
    Overlay,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Sum => "sum",
            MergeMode::Overlay => "overlay",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(MergeMode::Sum),
            "overlay" => Ok(MergeMode::Overlay),
            other => Err(format!("Unknown mode '{}'. Available: sum, overlay", other)),
        }
    }
}

/// Palette and chrome colours for one rendered graphic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub empty: String,
    /// Ordered from lowest to highest intensity.
    pub levels: [String; 4],
    pub text: String,
    pub background: String,
    pub border: String,
}

/// Intensity ramp assigned to one contributor in overlay mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPalette {
    pub levels: [String; 4],
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub mode: MergeMode,
    pub theme: String,
    pub usernames: Vec<String>,
    pub custom_theme: Option<ThemeColors>,
    pub custom_palettes: Option<Vec<OverlayPalette>>,
}

#[cfg(test)]
mod tests {
    use super::{MergeMode, MergedDay};
    use chrono::NaiveDate;

    #[test]
    fn merge_mode_parses_case_insensitively() {
        assert_eq!("Overlay".parse::<MergeMode>(), Ok(MergeMode::Overlay));
        assert_eq!(" sum ".parse::<MergeMode>(), Ok(MergeMode::Sum));
        assert!("stack".parse::<MergeMode>().is_err());
    }

    #[test]
    fn missing_user_counts_as_zero() {
        let mut day = MergedDay::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        day.per_user.insert("alice".to_string(), 4);
        assert_eq!(day.count_for("alice"), 4);
        assert_eq!(day.count_for("bob"), 0);
    }
}
