use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::{profile_repo, reports_repo};
use crate::error::AppResult;

#[derive(Debug, Deserialize, Default)]
pub struct ReportQuery {
    pub kind: Option<String>, // period|year
    pub year: Option<i32>,
    pub period: Option<u8>, // 1|2
}

// Bounds are rendered as `YYYY-MM-DD`.
const MIN_REPORT_YEAR: i32 = 1;
const MAX_REPORT_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    /// Calendar year.
    Year(i32),
    /// Half of a calendar year: 1 = January to June, 2 = July to December.
    Period { year: i32, half: u8 },
}

impl ReportRange {
    pub fn from_query(query: &ReportQuery, today: NaiveDate) -> Self {
        let year = query
            .year
            .unwrap_or_else(|| today.year())
            .clamp(MIN_REPORT_YEAR, MAX_REPORT_YEAR);
        match query.kind.as_deref() {
            Some("year") => Self::Year(year),
            _ => {
                let default_half = if today.month() <= 6 { 1 } else { 2 };
                let half = match query.period {
                    Some(1) => 1,
                    Some(2) => 2,
                    _ => default_half,
                };
                Self::Period { year, half }
            }
        }
    }

    /// Inclusive `YYYY-MM-DD` bounds.
    pub fn bounds(self) -> (String, String) {
        match self {
            Self::Year(y) => (format!("{:04}-01-01", y), format!("{:04}-12-31", y)),
            Self::Period { year, half: 1 } => {
                (format!("{:04}-01-01", year), format!("{:04}-06-30", year))
            }
            Self::Period { year, .. } => {
                (format!("{:04}-07-01", year), format!("{:04}-12-31", year))
            }
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Year(y) => Self::Year(y.saturating_sub(1)),
            Self::Period { year, half: 1 } => Self::Period {
                year: year.saturating_sub(1),
                half: 2,
            },
            Self::Period { year, .. } => Self::Period { year, half: 1 },
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Year(y) => format!("Year {}", y),
            Self::Period { year, half } => format!("Semester {} of {}", half, year),
        }
    }

    pub fn is_year(self) -> bool {
        matches!(self, Self::Year(_))
    }

    pub fn year(self) -> i32 {
        match self {
            Self::Year(y) | Self::Period { year: y, .. } => y,
        }
    }

    pub fn half(self) -> u8 {
        match self {
            Self::Year(_) => 0,
            Self::Period { half, .. } => half,
        }
    }
}

pub struct MetricView {
    pub label: String,
    pub value: String,
    pub delta: String,
}

pub struct BreakdownView {
    pub title: String,
    pub date: String,
    pub registrations: i64,
    pub evaluations: i64,
    pub average_rating: String,
}

pub struct YearOption {
    pub year: i32,
    pub selected: bool,
}

pub struct ReportPage {
    pub range_label: String,
    pub previous_label: String,
    pub is_year: bool,
    pub year: i32,
    pub half: u8,
    pub year_options: Vec<YearOption>,
    pub metrics: Vec<MetricView>,
    pub breakdown: Vec<BreakdownView>,
}

pub async fn build_report(
    pool: &SqlitePool,
    query: &ReportQuery,
    today: NaiveDate,
) -> AppResult<ReportPage> {
    let range = ReportRange::from_query(query, today);
    let previous = range.previous();
    let (from, to) = range.bounds();
    let (prev_from, prev_to) = previous.bounds();

    let current = reports_repo::load_range_totals(pool, &from, &to).await?;
    let before = reports_repo::load_range_totals(pool, &prev_from, &prev_to).await?;
    let students = profile_repo::count_students(pool).await?;

    let rate_now = participation_rate(current.participant_count, students);
    let rate_before = participation_rate(before.participant_count, students);

    let metrics = vec![
        MetricView {
            label: "Activities".to_string(),
            value: current.activity_count.to_string(),
            delta: signed(current.activity_count - before.activity_count),
        },
        MetricView {
            label: "Participating students".to_string(),
            value: current.participant_count.to_string(),
            delta: signed(current.participant_count - before.participant_count),
        },
        MetricView {
            label: "Participation rate".to_string(),
            value: format!("{}%", rate_now),
            delta: format!("{}%", signed(rate_now - rate_before)),
        },
        MetricView {
            label: "Average rating".to_string(),
            value: rating_label(current.average_rating),
            delta: match (current.average_rating, before.average_rating) {
                (Some(now), Some(then)) => signed_decimal(now - then),
                _ => "n/a".to_string(),
            },
        },
    ];

    let breakdown = reports_repo::list_activity_breakdown(pool, &from, &to)
        .await?
        .into_iter()
        .map(|r| BreakdownView {
            title: r.title,
            date: r.date,
            registrations: r.registrations,
            evaluations: r.evaluations,
            average_rating: rating_label(r.average_rating),
        })
        .collect();

    let this_year = today.year();
    Ok(ReportPage {
        range_label: range.label(),
        previous_label: previous.label(),
        is_year: range.is_year(),
        year: range.year(),
        half: range.half(),
        year_options: (this_year - 2..=this_year)
            .rev()
            .map(|year| YearOption {
                year,
                selected: year == range.year(),
            })
            .collect(),
        metrics,
        breakdown,
    })
}

/// Whole percent of all students that took part, 0 when there are none.
pub fn participation_rate(participants: i64, students: i64) -> i64 {
    if students <= 0 {
        return 0;
    }
    (participants.saturating_mul(100) / students).clamp(0, 100)
}

fn signed(n: i64) -> String {
    if n > 0 {
        format!("+{}", n)
    } else {
        n.to_string()
    }
}

fn signed_decimal(n: f64) -> String {
    if n > 0.0 {
        format!("+{:.1}", n)
    } else {
        format!("{:.1}", n)
    }
}

fn rating_label(avg: Option<f64>) -> String {
    avg.map(|a| format!("{:.1}", a))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_to_current_half_year() {
        let range = ReportRange::from_query(&ReportQuery::default(), day(2025, 10, 18));
        assert_eq!(range, ReportRange::Period { year: 2025, half: 2 });
        assert_eq!(
            range.bounds(),
            ("2025-07-01".to_string(), "2025-12-31".to_string())
        );
    }

    #[test]
    fn first_half_rolls_back_into_previous_year() {
        let range = ReportRange::Period { year: 2025, half: 1 };
        assert_eq!(range.previous(), ReportRange::Period { year: 2024, half: 2 });
        assert_eq!(
            ReportRange::Period { year: 2025, half: 2 }.previous(),
            ReportRange::Period { year: 2025, half: 1 }
        );
        assert_eq!(ReportRange::Year(2025).previous(), ReportRange::Year(2024));
    }

    #[test]
    fn year_query_spans_whole_year() {
        let query = ReportQuery {
            kind: Some("year".into()),
            year: Some(2023),
            period: Some(1),
        };
        let range = ReportRange::from_query(&query, day(2025, 1, 1));
        assert_eq!(
            range.bounds(),
            ("2023-01-01".to_string(), "2023-12-31".to_string())
        );
    }

    #[test]
    fn extreme_years_are_clamped() {
        let query = ReportQuery {
            kind: Some("year".into()),
            year: Some(i32::MIN),
            period: None,
        };
        let range = ReportRange::from_query(&query, day(2025, 1, 1));
        assert_eq!(range, ReportRange::Year(1));
        assert_eq!(range.previous(), ReportRange::Year(0));

        let query = ReportQuery {
            kind: None,
            year: Some(i32::MAX),
            period: Some(1),
        };
        let range = ReportRange::from_query(&query, day(2025, 1, 1));
        assert_eq!(range, ReportRange::Period { year: 9999, half: 1 });
        assert_eq!(
            range.bounds(),
            ("9999-01-01".to_string(), "9999-06-30".to_string())
        );
    }

    #[test]
    fn participation_rate_handles_empty_school() {
        assert_eq!(participation_rate(3, 0), 0);
        assert_eq!(participation_rate(1, 3), 33);
        assert_eq!(participation_rate(5, 4), 100);
        assert_eq!(signed(2), "+2");
        assert_eq!(signed(-1), "-1");
    }
}
