//! Property tests for the merge, layout, colour and escaping invariants.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use common::assert_well_formed;
use ghmerge::layout::{intensity_level, organize_into_weeks};
use ghmerge::theme::{generate_levels, hsl_to_hex, parse_hex, rgb_to_hsl};
use ghmerge::{
    ContributionDay, MergeMode, MergedDay, RenderOptions, UserContributions, merge_contributions,
    render_svg,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn user_strategy() -> impl Strategy<Value = BTreeMap<u64, u32>> {
    proptest::collection::btree_map(0u64..120, 0u32..50, 0..40)
}

fn to_users(raw: &[BTreeMap<u64, u32>]) -> Vec<UserContributions> {
    raw.iter()
        .enumerate()
        .map(|(i, days)| UserContributions {
            username: format!("user{i}"),
            total_contributions: days.values().sum(),
            days: days
                .iter()
                .map(|(&offset, &count)| ContributionDay {
                    date: epoch() + chrono::Days::new(offset),
                    count,
                })
                .collect(),
        })
        .collect()
}

fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

// ── Merger ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_covers_every_date_once_with_summed_totals(
        raw in proptest::collection::vec(user_strategy(), 0..6),
    ) {
        let users = to_users(&raw);
        let merged = merge_contributions(&users);

        let input_dates: BTreeSet<NaiveDate> =
            users.iter().flat_map(|u| u.days.iter().map(|d| d.date)).collect();
        let output_dates: Vec<NaiveDate> = merged.iter().map(|d| d.date).collect();
        prop_assert_eq!(output_dates.len(), input_dates.len());
        prop_assert!(output_dates.iter().copied().eq(input_dates.iter().copied()));

        for day in &merged {
            let expected: u32 = users
                .iter()
                .flat_map(|u| u.days.iter())
                .filter(|d| d.date == day.date)
                .map(|d| d.count)
                .sum();
            prop_assert_eq!(day.total_count, expected);
            prop_assert_eq!(day.per_user.values().sum::<u32>(), expected);
        }
    }

    #[test]
    fn merge_output_is_strictly_ascending(
        raw in proptest::collection::vec(user_strategy(), 1..6),
        reverse in any::<bool>(),
    ) {
        let mut users = to_users(&raw);
        if reverse {
            users.reverse();
            for user in &mut users {
                user.days.reverse();
            }
        }
        let merged = merge_contributions(&users);
        prop_assert!(merged.windows(2).all(|w| w[0].date < w[1].date));
    }
}

// ── Layout ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn intensity_level_is_monotonic(max in 1u32..1000, a in 0u32..2000, b in 0u32..2000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(intensity_level(lo, max) <= intensity_level(hi, max));
        prop_assert!(intensity_level(hi, max) <= 4);
        prop_assert_eq!(intensity_level(0, max), 0);
        prop_assert_eq!(intensity_level(a, 0), 0);
    }

    #[test]
    fn weeks_align_first_day_to_its_weekday(start in 0u64..3000, len in 1usize..400) {
        let first = epoch() + chrono::Days::new(start);
        let days: Vec<MergedDay> = first.iter_days().take(len).map(MergedDay::new).collect();
        let weeks = organize_into_weeks(&days);

        let leading = first.weekday().num_days_from_sunday() as usize;
        prop_assert_eq!(weeks.len(), (len + leading).div_ceil(7));
        prop_assert!(weeks[0].days[..leading].iter().all(Option::is_none));
        prop_assert_eq!(weeks[0].days[leading].map(|d| d.date), Some(first));

        let placed: usize = weeks.iter().map(|w| w.days.iter().flatten().count()).sum();
        prop_assert_eq!(placed, len);
        for (i, week) in weeks.iter().enumerate() {
            prop_assert_eq!(week.index, i);
            for (row, day) in week.days.iter().enumerate() {
                if let Some(day) = day {
                    prop_assert_eq!(day.date.weekday().num_days_from_sunday() as usize, row);
                }
            }
        }
    }
}

// ── Themes ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn generated_levels_keep_hue_and_saturation(
        h in 0.0f64..360.0,
        s in 40.0f64..100.0,
        l in 20.0f64..80.0,
        dark in any::<bool>(),
    ) {
        let base = hsl_to_hex(h, s, l);
        let (base_h, base_s, _) = rgb_to_hsl(parse_hex(&base).unwrap());
        let schedule = if dark { [15.0, 30.0, 50.0, 65.0] } else { [85.0, 65.0, 45.0, 30.0] };

        let levels = generate_levels(&base, dark).unwrap();
        for (level, target) in levels.iter().zip(schedule) {
            let (lh, ls, ll) = rgb_to_hsl(parse_hex(level).unwrap());
            prop_assert!(hue_distance(lh, base_h) <= 4.0, "hue {} vs {}", lh, base_h);
            prop_assert!((ls - base_s).abs() <= 4.0, "saturation {} vs {}", ls, base_s);
            prop_assert!((ll - target).abs() <= 1.0, "lightness {} vs {}", ll, target);
        }
    }
}

// ── Escaping ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn arbitrary_usernames_never_break_the_document(
        first in any::<String>(),
        second in any::<String>(),
        overlay in any::<bool>(),
    ) {
        prop_assume!(first != second);
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let users = vec![
            UserContributions {
                username: first.clone(),
                total_contributions: 2,
                days: vec![ContributionDay { date, count: 2 }],
            },
            UserContributions {
                username: second.clone(),
                total_contributions: 1,
                days: vec![ContributionDay { date, count: 1 }],
            },
        ];
        let options = RenderOptions {
            mode: if overlay { MergeMode::Overlay } else { MergeMode::Sum },
            theme: "github".to_string(),
            usernames: vec![first, second],
            ..Default::default()
        };

        let svg = render_svg(&merge_contributions(&users), &options);
        assert_well_formed(&svg);
    }
}
