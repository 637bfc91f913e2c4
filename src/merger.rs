use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{MergedDay, UserContributions};

/// Combine several users' calendars into one series covering every date any
/// of them reported, ascending by date.
pub fn merge_contributions(users: &[UserContributions]) -> Vec<MergedDay> {
    let mut by_date: BTreeMap<NaiveDate, MergedDay> = BTreeMap::new();

    for user in users {
        for day in &user.days {
            let merged = by_date
                .entry(day.date)
                .or_insert_with(|| MergedDay::new(day.date));
            merged.total_count = merged.total_count.saturating_add(day.count);
            if day.count > 0 {
                merged.per_user.insert(user.username.clone(), day.count);
            }
        }
    }

    by_date.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::merge_contributions;
    use crate::types::{ContributionDay, UserContributions};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user(name: &str, days: &[(NaiveDate, u32)]) -> UserContributions {
        UserContributions {
            username: name.to_string(),
            total_contributions: days.iter().map(|(_, c)| c).sum(),
            days: days
                .iter()
                .map(|&(date, count)| ContributionDay { date, count })
                .collect(),
        }
    }

    #[test]
    fn empty_input_merges_to_nothing() {
        assert!(merge_contributions(&[]).is_empty());
    }

    #[test]
    fn disjoint_dates_keep_single_contributor() {
        let users = [
            user("alice", &[(date(2024, 1, 2), 4)]),
            user("bob", &[(date(2024, 1, 1), 7)]),
        ];
        let merged = merge_contributions(&users);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, date(2024, 1, 1));
        assert_eq!(merged[0].total_count, 7);
        assert!(!merged[0].per_user.contains_key("alice"));
        assert_eq!(merged[1].total_count, 4);
        assert!(!merged[1].per_user.contains_key("bob"));
    }

    #[test]
    fn shared_date_sums_counts() {
        let users = [
            user("alice", &[(date(2024, 5, 6), 3)]),
            user("bob", &[(date(2024, 5, 6), 5)]),
        ];
        let merged = merge_contributions(&users);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].total_count, 8);
        assert_eq!(merged[0].count_for("alice"), 3);
        assert_eq!(merged[0].count_for("bob"), 5);
    }

    #[test]
    fn zero_counts_create_the_day_but_no_user_entry() {
        let users = [
            user("alice", &[(date(2024, 5, 6), 0)]),
            user("bob", &[(date(2024, 5, 6), 2)]),
        ];
        let merged = merge_contributions(&users);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].total_count, 2);
        assert_eq!(merged[0].per_user.len(), 1);
        assert_eq!(merged[0].count_for("alice"), 0);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let users = [
            user("alice", &[(date(2024, 5, 6), u32::MAX)]),
            user("bob", &[(date(2024, 5, 6), u32::MAX)]),
        ];
        let merged = merge_contributions(&users);

        assert_eq!(merged[0].total_count, u32::MAX);
        assert_eq!(merged[0].count_for("bob"), u32::MAX);
    }
}
