//! Order history query and statistics

use super::order::{Order, OrderStatus};
use crate::money;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of orders a history query returns
pub const HISTORY_LIMIT: i64 = 500;

/// Status grouping in the history view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    /// Still in the kitchen (`new`, `preparing`)
    Active,
    /// Served or settled (`done`, `paid`)
    Completed,
}

impl HistoryFilter {
    pub fn admits(self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => matches!(status, OrderStatus::New | OrderStatus::Preparing),
            Self::Completed => matches!(status, OrderStatus::Done | OrderStatus::Paid),
        }
    }
}

/// Calendar window, evaluated in UTC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    /// Current week, starting Monday
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeRange {
    /// Start of the window containing `now`, `None` for [`TimeRange::All`]
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let day = match self {
            Self::All => return None,
            Self::Today => today,
            Self::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            Self::Month => NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?,
            Self::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        };
        Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
    }

    /// Start of the window in Unix milliseconds
    pub fn start_millis(self, now: DateTime<Utc>) -> Option<i64> {
        self.start(now).map(|t| t.timestamp_millis())
    }
}

/// Query string of the history endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub status: HistoryFilter,
    #[serde(default)]
    pub range: TimeRange,
}

/// Revenue figures over a set of orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub revenue: f64,
    pub count: usize,
    pub average: f64,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let revenue: rust_decimal::Decimal = orders
            .iter()
            .map(|o| money::to_decimal(o.total_price))
            .sum();
        let count = orders.len();
        let average = if count > 0 {
            revenue / rust_decimal::Decimal::from(count)
        } else {
            rust_decimal::Decimal::ZERO
        };
        Self {
            revenue: money::to_f64(revenue),
            count,
            average: money::to_f64(average),
        }
    }
}

/// History page: the orders plus their statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub stats: OrderStats,
}

impl OrderHistory {
    pub fn new(orders: Vec<Order>) -> Self {
        let stats = OrderStats::from_orders(&orders);
        Self { orders, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_week_starts_monday() {
        // 2026-10-16 is a Friday
        let start = TimeRange::Week.start(at(2026, 10, 16, 15)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap());

        // A Monday is its own week start
        let start = TimeRange::Week.start(at(2026, 10, 12, 1)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap());

        // Sunday belongs to the week that began six days earlier
        let start = TimeRange::Week.start(at(2026, 10, 18, 23)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_other_ranges() {
        let now = at(2026, 10, 16, 15);
        assert_eq!(
            TimeRange::Today.start(now).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
        );
        assert_eq!(
            TimeRange::Month.start(now).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            TimeRange::Year.start(now).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(TimeRange::All.start(now).is_none());
    }

    #[test]
    fn test_filter_groups() {
        assert!(HistoryFilter::Active.admits(OrderStatus::Preparing));
        assert!(!HistoryFilter::Active.admits(OrderStatus::Done));
        assert!(HistoryFilter::Completed.admits(OrderStatus::Paid));
        assert!(!HistoryFilter::Completed.admits(OrderStatus::New));
        assert!(HistoryFilter::All.admits(OrderStatus::New));
    }

    #[test]
    fn test_stats() {
        let order = |total: f64| Order {
            id: 1,
            store_id: 1,
            table_no: "1".into(),
            total_price: total,
            status: OrderStatus::Paid,
            items: vec![],
            created_at: 0,
        };
        let stats = OrderStats::from_orders(&[order(10.0), order(20.5), order(5.0)]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.revenue, 35.5);
        assert_eq!(stats.average, 11.83);

        assert_eq!(OrderStats::from_orders(&[]), OrderStats::default());
    }

    #[test]
    fn test_query_defaults() {
        let q: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.status, HistoryFilter::All);
        assert_eq!(q.range, TimeRange::All);
    }
}
