// src/analytics.rs

//! Aggregation of raw test results into dashboard views.
//!
//! Everything here is a pure function over a borrowed slice of records:
//! no I/O, no shared state. Handlers fetch a snapshot from the store and
//! pass it in.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use indexmap::IndexMap;

use crate::models::{
    analytics::{ActivityPoint, AnalyticsReport, CorrectIncorrectSummary, TestRanking},
    result::ResultRecord,
};

/// Maximum number of entries in `AnalyticsReport::top_tests`.
pub const TOP_TESTS_LIMIT: usize = 5;

/// Time zone in which `takenAt` timestamps are bucketed into months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeZoneChoice {
    /// Time zone of the running process.
    #[default]
    Local,
    Utc,
}

impl FromStr for TimeZoneChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(TimeZoneChoice::Local),
            "utc" => Ok(TimeZoneChoice::Utc),
            other => Err(format!("unknown time zone '{}'", other)),
        }
    }
}

impl TimeZoneChoice {
    pub fn compute(self, records: &[ResultRecord], username: Option<&str>) -> AnalyticsReport {
        match self {
            TimeZoneChoice::Local => compute_analytics_in(records, username, &Local),
            TimeZoneChoice::Utc => compute_analytics_in(records, username, &Utc),
        }
    }
}

/// Computes the full report, bucketing months in the process-local time zone.
pub fn compute_analytics(records: &[ResultRecord], username: Option<&str>) -> AnalyticsReport {
    compute_analytics_in(records, username, &Local)
}

/// Computes the full report, bucketing months in `tz`.
///
/// * `username`: when set, only that user's results are considered (exact match).
pub fn compute_analytics_in<Tz: TimeZone>(
    records: &[ResultRecord],
    username: Option<&str>,
    tz: &Tz,
) -> AnalyticsReport {
    let retained = filter_by_username(records, username);

    let mut top_tests = rank_tests(retained.iter().copied());
    top_tests.truncate(TOP_TESTS_LIMIT);

    AnalyticsReport {
        correct_incorrect: summarize_answers(retained.iter().copied()),
        top_tests,
        activity: monthly_activity(retained.iter().copied(), tz),
    }
}

/// Keeps the records of `username`, or all of them when no name is given.
pub fn filter_by_username<'a>(
    records: &'a [ResultRecord],
    username: Option<&str>,
) -> Vec<&'a ResultRecord> {
    match username {
        Some(name) => records.iter().filter(|r| r.username == name).collect(),
        None => records.iter().collect(),
    }
}

/// Counts correct and incorrect answers across every record.
pub fn summarize_answers<'a, I>(records: I) -> CorrectIncorrectSummary
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut summary = CorrectIncorrectSummary::default();
    for answer in records.into_iter().flat_map(|r| &r.answers) {
        summary.record(answer.correct);
    }
    summary
}

/// Groups records by test title, most taken first.
///
/// The ranking is not truncated. Titles with equal `taken` keep the order
/// in which they first appear in `records`. Titles are compared verbatim and
/// are not scoped by owner, so two users' tests with the same title share an
/// entry.
pub fn rank_tests<'a, I>(records: I) -> Vec<TestRanking>
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut groups: IndexMap<&str, TestRanking> = IndexMap::new();

    for record in records {
        let entry = groups
            .entry(record.test_title.as_str())
            .or_insert_with(|| TestRanking {
                name: record.test_title.clone(),
                taken: 0,
                correct: 0,
                incorrect: 0,
            });

        entry.taken += 1;
        for answer in &record.answers {
            if answer.correct {
                entry.correct += 1;
            } else {
                entry.incorrect += 1;
            }
        }
    }

    let mut ranking: Vec<TestRanking> = groups.into_values().collect();
    // `sort_by` is stable, ties stay in first-seen order.
    ranking.sort_by(|a, b| b.taken.cmp(&a.taken));
    ranking
}

/// Counts records per `YYYY-MM` month, oldest month first.
///
/// Records whose `takenAt` cannot be parsed are left out of this view.
pub fn monthly_activity<'a, I, Tz>(records: I, tz: &Tz) -> Vec<ActivityPoint>
where
    I: IntoIterator<Item = &'a ResultRecord>,
    Tz: TimeZone,
{
    let mut months: BTreeMap<String, u64> = BTreeMap::new();

    for record in records {
        match month_key(&record.taken_at, tz) {
            Some(key) => *months.entry(key).or_default() += 1,
            None => tracing::debug!(
                "Skipping result of '{}' with unparseable takenAt '{}'",
                record.username,
                record.taken_at
            ),
        }
    }

    months
        .into_iter()
        .map(|(month, count)| ActivityPoint { month, count })
        .collect()
}

/// Derives the `YYYY-MM` bucket of a timestamp in `tz`.
pub fn month_key<Tz: TimeZone>(taken_at: &str, tz: &Tz) -> Option<String> {
    let taken_at = parse_taken_at(taken_at, tz)?;
    Some(format!("{:04}-{:02}", taken_at.year(), taken_at.month()))
}

/// Parses the timestamp layouts the frontend and older records use.
///
/// * RFC 3339 with an offset, or `Z`, down to minute precision: converted to `tz`.
/// * Date and time without an offset: read as wall-clock time in `tz`.
/// * Bare date, year-month or year: read as midnight UTC on the first
///   matching day, then converted to `tz`.
fn parse_taken_at<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%#z") {
        return Some(dt.with_timezone(tz));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return from_wall_clock(&naive, tz);
        }
    }

    let date = match raw.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", raw), "%Y-%m-%d"),
        7 => NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d"),
        _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d"),
    };

    date.ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().with_timezone(tz))
}

/// Resolves a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times skipped by a DST jump are moved forward one hour.
fn from_wall_clock<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(naive).earliest().or_else(|| {
        tz.from_local_datetime(&(*naive + TimeDelta::hours(1)))
            .earliest()
    })
}
