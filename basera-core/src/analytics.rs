use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reporting window for the dashboard endpoints. The window also picks the
/// trend granularity: daily for a week, weekly for a month, monthly for a
/// year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Week,
    Month,
    Year,
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendPeriod::Week => "week",
            TrendPeriod::Month => "month",
            TrendPeriod::Year => "year",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TrendPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(TrendPeriod::Week),
            "month" => Ok(TrendPeriod::Month),
            "year" => Ok(TrendPeriod::Year),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

/// Start of the rolling totals window for a period.
pub fn period_start(period: TrendPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        TrendPeriod::Week => now - Duration::days(7),
        TrendPeriod::Month => now - Duration::days(30),
        TrendPeriod::Year => now - Duration::days(365),
    }
}

/// A half-open time range `[start, end)` with its chart label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

/// Buckets for the trend series, oldest first: the last 7 days, the last 4
/// ISO weeks, or the last 12 calendar months, always including the current
/// one.
pub fn trend_buckets(period: TrendPeriod, now: DateTime<Utc>) -> Vec<TrendBucket> {
    match period {
        TrendPeriod::Week => (0..7i64)
            .map(|i| {
                let day = now.date_naive() - Duration::days(6 - i);
                let start = day.and_time(NaiveTime::MIN).and_utc();
                TrendBucket {
                    start,
                    end: start + Duration::days(1),
                    label: day.format("%a").to_string(),
                }
            })
            .collect(),
        TrendPeriod::Month => {
            let monday =
                now.date_naive() - Duration::days(now.weekday().num_days_from_monday() as i64);
            (0..4i64)
                .map(|i| {
                    let week = monday - Duration::days((3 - i) * 7);
                    let start = week.and_time(NaiveTime::MIN).and_utc();
                    TrendBucket {
                        start,
                        end: start + Duration::days(7),
                        label: format!("Week {}", i + 1),
                    }
                })
                .collect()
        }
        TrendPeriod::Year => {
            let month_index = now.year() * 12 + now.month0() as i32;
            (0..12i32)
                .map(|i| {
                    let idx = month_index - (11 - i);
                    let (year, month) = (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1);
                    let start_date = month_start(year, month);
                    let next = year * 12 + month as i32; // idx + 1
                    let end_date = month_start(next.div_euclid(12), next.rem_euclid(12) as u32 + 1);
                    TrendBucket {
                        start: start_date.and_time(NaiveTime::MIN).and_utc(),
                        end: end_date.and_time(NaiveTime::MIN).and_utc(),
                        label: start_date.format("%b %y").to_string(),
                    }
                })
                .collect()
        }
    }
}

/// One point of a trend series. Revenue points carry minor units.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct DashboardOverview {
    pub total_users: i64,
    pub total_listings: i64,
    pub total_bookings: i64,
    pub active_users: i64,
    pub period_bookings: i64,
    pub total_revenue_minor: i64,
    pub period_revenue_minor: i64,
    pub pending_listers: i64,
    pub pending_bookings: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct DashboardTrends {
    pub bookings: Vec<TrendPoint>,
    pub users: Vec<TrendPoint>,
    pub revenue: Vec<TrendPoint>,
}

/// Admin dashboard rollup. Pure read; nothing here is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardAnalytics {
    pub overview: DashboardOverview,
    pub bookings_by_status: BTreeMap<String, i64>,
    pub listings_by_type: BTreeMap<String, i64>,
    pub trends: DashboardTrends,
    pub period: TrendPeriod,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct OwnerOverview {
    pub total_listings: i64,
    pub total_bookings: i64,
    pub period_bookings: i64,
    pub unique_customers: i64,
    pub total_revenue_minor: i64,
    pub period_revenue_minor: i64,
    pub pending_bookings: i64,
    pub avg_booking_value_minor: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct OwnerTrends {
    pub bookings: Vec<TrendPoint>,
    pub revenue: Vec<TrendPoint>,
}

/// Per-lister rollup, scoped to the caller's listings.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerAnalytics {
    pub overview: OwnerOverview,
    pub bookings_by_status: BTreeMap<String, i64>,
    pub trends: OwnerTrends,
    pub period: TrendPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        // A Wednesday.
        Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 0).unwrap()
    }

    #[test]
    fn week_has_seven_daily_buckets_ending_today() {
        let buckets = trend_buckets(TrendPeriod::Week, fixed_now());
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].label, "Thu");
        assert_eq!(buckets[6].label, "Wed");
        for bucket in &buckets {
            assert_eq!(bucket.end - bucket.start, Duration::days(1));
        }
        // Contiguous and covering "now".
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let last = buckets.last().unwrap();
        assert!(last.start <= fixed_now() && fixed_now() < last.end);
    }

    #[test]
    fn month_has_four_weekly_buckets_aligned_to_monday() {
        let buckets = trend_buckets(TrendPeriod::Month, fixed_now());
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].label, "Week 1");
        assert_eq!(buckets[3].label, "Week 4");
        // 2025-03-12 is a Wednesday; the current week starts Monday the 10th.
        assert_eq!(
            buckets[3].start,
            Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()
        );
        for bucket in &buckets {
            assert_eq!(bucket.end - bucket.start, Duration::days(7));
        }
    }

    #[test]
    fn year_has_twelve_calendar_months() {
        let buckets = trend_buckets(TrendPeriod::Year, fixed_now());
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "Apr 24");
        assert_eq!(buckets[11].label, "Mar 25");
        assert_eq!(
            buckets[11].start,
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            buckets[11].end,
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
        );
        // February of a non-leap year.
        assert_eq!(buckets[10].end - buckets[10].start, Duration::days(28));
    }

    #[test]
    fn year_buckets_cross_january() {
        let january = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        let buckets = trend_buckets(TrendPeriod::Year, january);
        assert_eq!(buckets[0].label, "Feb 24");
        assert_eq!(buckets[11].label, "Jan 25");
    }

    #[test]
    fn period_start_windows() {
        let now = fixed_now();
        assert_eq!(period_start(TrendPeriod::Week, now), now - Duration::days(7));
        assert_eq!(
            period_start(TrendPeriod::Month, now),
            now - Duration::days(30)
        );
        assert_eq!(
            period_start(TrendPeriod::Year, now),
            now - Duration::days(365)
        );
    }

    #[test]
    fn period_parses() {
        assert_eq!("week".parse::<TrendPeriod>(), Ok(TrendPeriod::Week));
        assert!("quarter".parse::<TrendPeriod>().is_err());
    }
}
