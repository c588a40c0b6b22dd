// service/aggregator.rs
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use crate::{
    models::propertymodel::{categorical_value, PropertyRecord},
    service::trailing_window::TrailingWindow,
};

pub const OTHER_BUCKET: &str = "Other";

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub month: u32,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub new_this_week: usize,
    pub total_value: f64,
}

/// Group counts sorted by count, descending. Ties keep first-seen order
/// (`sort_by` is stable). Blank or placeholder keys land in "Other".
pub fn distribution<F>(records: &[PropertyRecord], key_fn: F) -> Vec<Bucket>
where
    F: Fn(&PropertyRecord) -> String,
{
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let raw = key_fn(record);
        let key = match categorical_value(&raw) {
            "" => OTHER_BUCKET.to_string(),
            key => key.to_string(),
        };

        match index.get(&key) {
            Some(&i) => buckets[i].count += 1,
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket { key, count: 1 });
            }
        }
    }

    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Trailing-window filter first, then [`distribution`].
pub fn windowed_distribution<F>(
    records: &[PropertyRecord],
    window: TrailingWindow,
    now: DateTime<Utc>,
    key_fn: F,
) -> Vec<Bucket>
where
    F: Fn(&PropertyRecord) -> String,
{
    let in_window: Vec<PropertyRecord> = records
        .iter()
        .filter(|r| window.admits(r.created_at, now))
        .cloned()
        .collect();
    distribution(&in_window, key_fn)
}

/// Listings created per month of `year`. Undated records are dropped.
pub fn monthly_trend(records: &[PropertyRecord], year: i32) -> Vec<MonthBucket> {
    let mut counts = [0usize; 12];
    for created in records.iter().filter_map(|r| r.created_at) {
        if created.year() == year {
            counts[created.month0() as usize] += 1;
        }
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, count)| MonthBucket {
            month: i as u32 + 1,
            label: MONTH_LABELS[i],
            count: *count,
        })
        .collect()
}

/// Newest `n` records by `createdAt`; undated ones sort last.
pub fn recent(records: &[PropertyRecord], n: usize) -> Vec<PropertyRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(n);
    sorted
}

pub fn summary(records: &[PropertyRecord], now: DateTime<Utc>) -> Summary {
    let week_ago = now - Duration::days(7);
    Summary {
        total: records.len(),
        new_this_week: records
            .iter()
            .filter_map(|r| r.created_at)
            .filter(|at| *at >= week_ago && *at <= now)
            .count(),
        total_value: records.iter().filter_map(|r| r.price).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::propertymodel::{sample_record, PLACEHOLDER};
    use chrono::TimeZone;

    fn record(id: &str, kind: &str, created: Option<(i32, u32, u32)>) -> PropertyRecord {
        let mut r = sample_record(id);
        r.property_type = kind.to_string();
        r.created_at = created.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap());
        r
    }

    fn by_type(r: &PropertyRecord) -> String {
        r.property_type.clone()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 25, 12, 0, 0).unwrap()
    }

    #[test]
    fn type_distribution_over_all_window() {
        let records = vec![
            record("1", "flat", Some((2025, 1, 5))),
            record("2", "villa", Some((2025, 1, 20))),
            record("3", "flat", None),
        ];

        let buckets = windowed_distribution(&records, TrailingWindow::All, now(), by_type);
        assert_eq!(
            buckets,
            vec![
                Bucket { key: "flat".to_string(), count: 2 },
                Bucket { key: "villa".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let records = vec![
            record("1", "plot", None),
            record("2", "villa", None),
            record("3", "flat", None),
            record("4", "villa", None),
            record("5", "flat", None),
        ];

        let keys: Vec<_> = distribution(&records, by_type).into_iter().map(|b| b.key).collect();
        assert_eq!(keys, vec!["villa", "flat", "plot"]);
    }

    #[test]
    fn blank_keys_fold_into_other() {
        let records = vec![
            record("1", PLACEHOLDER, None),
            record("2", "  ", None),
            record("3", "flat", None),
        ];

        let buckets = distribution(&records, by_type);
        assert_eq!(buckets[0], Bucket { key: OTHER_BUCKET.to_string(), count: 2 });
        assert_eq!(buckets[1], Bucket { key: "flat".to_string(), count: 1 });
    }

    #[test]
    fn counts_sum_to_records_in_window() {
        let records = vec![
            record("1", "flat", Some((2025, 1, 5))),
            record("2", "villa", Some((2024, 12, 20))),
            record("3", "flat", None),
            record("4", PLACEHOLDER, Some((2025, 1, 24))),
            record("5", "villa", Some((2025, 2, 1))),
        ];

        for window in [TrailingWindow::All, TrailingWindow::ThisMonth, TrailingWindow::ThisYear] {
            let total: usize = windowed_distribution(&records, window, now(), by_type)
                .iter()
                .map(|b| b.count)
                .sum();
            let expected = records
                .iter()
                .filter(|r| window.admits(r.created_at, now()))
                .count();
            assert_eq!(total, expected, "window {:?}", window);
        }
    }

    #[test]
    fn this_month_window_excludes_undated_and_future() {
        let records = vec![
            record("1", "flat", Some((2025, 1, 5))),
            record("2", "flat", None),
            record("3", "flat", Some((2025, 2, 1))),
        ];
        let buckets = windowed_distribution(&records, TrailingWindow::ThisMonth, now(), by_type);
        assert_eq!(buckets, vec![Bucket { key: "flat".to_string(), count: 1 }]);
    }

    #[test]
    fn monthly_trend_drops_undated_and_other_years() {
        let records = vec![
            record("1", "flat", Some((2025, 1, 5))),
            record("2", "flat", Some((2025, 1, 20))),
            record("3", "flat", Some((2025, 3, 2))),
            record("4", "flat", Some((2024, 3, 2))),
            record("5", "flat", None),
        ];

        let trend = monthly_trend(&records, 2025);
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[0].label, "Jan");
        assert_eq!(trend[2].count, 1);
        assert_eq!(trend.iter().map(|m| m.count).sum::<usize>(), 3);
    }

    #[test]
    fn recent_puts_undated_last() {
        let records = vec![
            record("old", "flat", Some((2024, 5, 1))),
            record("none", "flat", None),
            record("new", "flat", Some((2025, 1, 20))),
        ];
        let ids: Vec<_> = recent(&records, 2).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn summary_counts_new_this_week_and_value() {
        let mut a = record("1", "flat", Some((2025, 1, 20)));
        a.price = Some(1_000_000.0);
        let mut b = record("2", "flat", Some((2025, 1, 2)));
        b.price = Some(500_000.0);
        let c = record("3", "flat", None);

        let s = summary(&[a, b, c], now());
        assert_eq!(s.total, 3);
        assert_eq!(s.new_this_week, 1);
        assert_eq!(s.total_value, 1_500_000.0);
    }
}
