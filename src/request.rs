use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MergeError, Result};
use crate::theme::{DEFAULT_THEME, is_known_theme, is_overlay_theme, parse_hex};
use crate::types::{MergeMode, ThemeColors};

pub const MIN_USERS: usize = 2;
pub const MAX_USERS: usize = 10;
pub const MAX_USERNAME_LEN: usize = 39;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](-?[A-Za-z0-9])*$").expect("username pattern must compile")
});

/// Raw caller input, before validation.
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    /// Each entry may itself be a comma-separated list.
    pub users: Vec<String>,
    pub mode: Option<String>,
    pub theme: Option<String>,
    pub colors: Option<String>,
    pub dark: bool,
    pub theme_file: Option<ThemeColors>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub usernames: Vec<String>,
    pub mode: MergeMode,
    pub theme: String,
    /// Lower-case `rrggbb` values, in contributor order.
    pub colors: Vec<String>,
    pub dark: bool,
    pub theme_file: Option<ThemeColors>,
}

pub fn is_valid_username(name: &str) -> bool {
    name.len() <= MAX_USERNAME_LEN && USERNAME_RE.is_match(name)
}

/// Split, trim and de-duplicate usernames, keeping first-seen order.
pub fn parse_usernames<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut usernames: Vec<String> = Vec::new();
    for entry in raw {
        for name in entry.as_ref().split(',').map(str::trim) {
            if !name.is_empty() && !usernames.iter().any(|u| u == name) {
                usernames.push(name.to_string());
            }
        }
    }
    usernames
}

pub fn parse_colors(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| {
            parse_hex(c)?;
            Ok(c.trim_start_matches('#').to_ascii_lowercase())
        })
        .collect()
}

impl MergeRequest {
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let usernames = parse_usernames(self.users.as_slice());
        if usernames.len() < MIN_USERS {
            return Err(MergeError::Validation(format!(
                "At least {} usernames required. Use --users user1,user2 or repeat --user.",
                MIN_USERS
            )));
        }
        if usernames.len() > MAX_USERS {
            return Err(MergeError::Validation(format!(
                "Maximum {} users allowed.",
                MAX_USERS
            )));
        }
        if let Some(bad) = usernames.iter().find(|u| !is_valid_username(u)) {
            return Err(MergeError::Validation(format!(
                "Invalid GitHub username: \"{}\"",
                bad
            )));
        }

        let mode = self
            .mode
            .as_deref()
            .and_then(|m| m.parse::<MergeMode>().ok())
            .unwrap_or_default();

        let theme = match self.theme.as_deref().map(str::trim) {
            Some(name) if mode == MergeMode::Overlay && is_known_theme(name) && !is_overlay_theme(name) => {
                return Err(MergeError::Validation(format!(
                    "Theme \"{}\" is not available in overlay mode.",
                    name
                )));
            }
            Some(name) if is_known_theme(name) => name.to_string(),
            _ => DEFAULT_THEME.to_string(),
        };

        let colors = match self.colors.as_deref() {
            Some(raw) => parse_colors(raw)?,
            None => Vec::new(),
        };

        Ok(ValidatedRequest {
            usernames,
            mode,
            theme,
            colors,
            dark: self.dark,
            theme_file: self.theme_file.clone(),
        })
    }
}

impl ValidatedRequest {
    /// Key that separates every visual variant of the same user set.
    pub fn cache_key(&self) -> String {
        let mut key = format!(
            "svg:{}:{}:{}:{}:{}",
            self.usernames.join(","),
            self.mode,
            self.theme,
            self.colors.join(","),
            if self.dark { "dark" } else { "light" },
        );
        if let Some(file) = &self.theme_file {
            key.push_str(&format!(
                ":file={}/{}/{}/{}/{}",
                file.empty,
                file.levels.join(","),
                file.text,
                file.background,
                file.border
            ));
        }
        key
    }
}
