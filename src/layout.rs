use std::collections::HashMap;

use chrono::Datelike;

use crate::types::{MergeMode, MergedDay, OverlayPalette, ThemeColors};

pub const DAYS_IN_WEEK: usize = 7;

/// One column of the calendar grid, Sunday through Saturday.
///
/// Slots outside the merged series are `None` and are never drawn.
#[derive(Debug, Clone)]
pub struct WeekColumn<'a> {
    pub index: usize,
    pub days: [Option<&'a MergedDay>; DAYS_IN_WEEK],
}

impl<'a> WeekColumn<'a> {
    pub fn first_day(&self) -> Option<&'a MergedDay> {
        self.days.iter().flatten().next().copied()
    }
}

/// Month label anchored at the first column where that month appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthLabel {
    /// Zero-based month (0 = January).
    pub month: u32,
    pub week_index: usize,
}

/// Group days into Sunday-aligned week columns.
pub fn organize_into_weeks(days: &[MergedDay]) -> Vec<WeekColumn<'_>> {
    let Some(first) = days.first() else {
        return Vec::new();
    };

    let leading = first.date.weekday().num_days_from_sunday() as usize;
    let slots = leading + days.len();
    let mut weeks: Vec<WeekColumn<'_>> = (0..slots.div_ceil(DAYS_IN_WEEK))
        .map(|index| WeekColumn {
            index,
            days: [None; DAYS_IN_WEEK],
        })
        .collect();

    for (offset, day) in days.iter().enumerate() {
        let slot = leading + offset;
        weeks[slot / DAYS_IN_WEEK].days[slot % DAYS_IN_WEEK] = Some(day);
    }

    weeks
}

pub fn month_labels(weeks: &[WeekColumn<'_>]) -> Vec<MonthLabel> {
    let mut labels: Vec<MonthLabel> = Vec::new();

    for week in weeks {
        let Some(day) = week.first_day() else {
            continue;
        };
        let month = day.date.month0();
        if labels.last().map(|label| label.month) != Some(month) {
            labels.push(MonthLabel {
                month,
                week_index: week.index,
            });
        }
    }

    labels
}

/// Bucket a count into intensity 0..=4 relative to `max`.
pub fn intensity_level(count: u32, max: u32) -> u8 {
    if count == 0 || max == 0 {
        return 0;
    }

    let ratio = count as f64 / max as f64;
    if ratio <= 0.25 {
        1
    } else if ratio <= 0.50 {
        2
    } else if ratio <= 0.75 {
        3
    } else {
        4
    }
}

pub fn global_max(days: &[MergedDay]) -> u32 {
    days.iter().map(|d| d.total_count).max().unwrap_or(0).max(1)
}

pub fn per_user_max(days: &[MergedDay], usernames: &[String]) -> HashMap<String, u32> {
    usernames
        .iter()
        .map(|username| {
            let max = days
                .iter()
                .map(|d| d.count_for(username))
                .max()
                .unwrap_or(0)
                .max(1);
            (username.clone(), max)
        })
        .collect()
}

/// The user with the strictly greatest count on `day`; earlier usernames win
/// ties. `None` when nobody contributed.
pub fn dominant_contributor<'u>(day: &MergedDay, usernames: &'u [String]) -> Option<(usize, &'u str, u32)> {
    let mut leader: Option<(usize, &'u str, u32)> = None;
    for (index, username) in usernames.iter().enumerate() {
        let count = day.count_for(username);
        if count > leader.map_or(0, |(_, _, best)| best) {
            leader = Some((index, username.as_str(), count));
        }
    }
    leader
}

/// Resolves a fill colour for each real day under the selected blend mode.
pub struct CellColorizer<'a> {
    mode: MergeMode,
    theme: &'a ThemeColors,
    palettes: &'a [OverlayPalette],
    usernames: &'a [String],
    max_count: u32,
    max_per_user: HashMap<String, u32>,
}

impl<'a> CellColorizer<'a> {
    pub fn new(
        days: &[MergedDay],
        mode: MergeMode,
        theme: &'a ThemeColors,
        palettes: &'a [OverlayPalette],
        usernames: &'a [String],
    ) -> Self {
        let max_per_user = match mode {
            MergeMode::Overlay => per_user_max(days, usernames),
            MergeMode::Sum => HashMap::new(),
        };
        Self {
            mode,
            theme,
            palettes,
            usernames,
            max_count: global_max(days),
            max_per_user,
        }
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn max_for(&self, username: &str) -> u32 {
        self.max_per_user.get(username).copied().unwrap_or(1)
    }

    pub fn fill(&self, day: &MergedDay) -> &'a str {
        if day.total_count == 0 {
            return &self.theme.empty;
        }

        match self.mode {
            MergeMode::Sum => self.level_color(intensity_level(day.total_count, self.max_count), None),
            MergeMode::Overlay => match dominant_contributor(day, self.usernames) {
                Some((index, username, count)) => {
                    let level = intensity_level(count, self.max_for(username));
                    self.level_color(level, Some(index))
                }
                None => &self.theme.empty,
            },
        }
    }

    fn level_color(&self, level: u8, contributor: Option<usize>) -> &'a str {
        if level == 0 {
            return &self.theme.empty;
        }
        let slot = (level - 1) as usize;
        match contributor {
            Some(index) if !self.palettes.is_empty() => {
                &self.palettes[index % self.palettes.len()].levels[slot]
            }
            _ => &self.theme.levels[slot],
        }
    }
}
