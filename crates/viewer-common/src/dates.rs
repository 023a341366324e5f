//! Date handling for product queries.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Date format used on every wire surface (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days between the default start and end dates.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Default and valid dates for a product's date pickers.
///
/// `default_start` is always `today - 30 days`, even for products whose
/// valid range is shorter than that. In that case the default falls before
/// `valid_start` and a request using it will be rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDates {
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
    pub valid_start: NaiveDate,
    pub valid_end: NaiveDate,
}

impl ProductDates {
    pub fn resolve(product: &Product, today: NaiveDate) -> Self {
        Self {
            default_start: today - Duration::days(DEFAULT_LOOKBACK_DAYS),
            default_end: today,
            valid_start: product.start_date,
            valid_end: product.end_date.unwrap_or(today),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.valid_start && date <= self.valid_end
    }
}

/// Date range of a query. The remote date filter treats `end` as exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days covered; zero when start and end coincide.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_resolve_open_ended_product() {
        let catalog = Catalog::builtin().unwrap();
        let snow = catalog.product("modis", "terra", "snow").unwrap();
        let dates = ProductDates::resolve(snow, today());

        assert_eq!(dates.default_end, today());
        assert_eq!(dates.default_start, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
        assert_eq!(dates.valid_start, NaiveDate::from_ymd_opt(2000, 2, 24).unwrap());
        assert_eq!(dates.valid_end, today());
    }

    #[test]
    fn test_resolve_every_catalog_product() {
        let catalog = Catalog::builtin().unwrap();
        for (_, _, product) in catalog.products() {
            let dates = ProductDates::resolve(product, today());
            assert!(dates.default_start < dates.default_end);
            assert!(parse_date(&format_date(dates.default_start)).is_some());
            assert!(parse_date(&format_date(dates.default_end)).is_some());
        }
    }

    #[test]
    fn test_young_product_default_start_precedes_valid_start() {
        let catalog = Catalog::builtin().unwrap();
        let mut product = catalog.product("modis", "terra", "snow").unwrap().clone();
        product.start_date = today() - Duration::days(10);

        let dates = ProductDates::resolve(&product, today());
        assert!(dates.default_start < dates.valid_start);
        assert!(!dates.contains(dates.default_start));
    }

    #[test]
    fn test_closed_product_uses_registered_end() {
        let catalog = Catalog::builtin().unwrap();
        let mut product = catalog.product("sentinel", "5", "co").unwrap().clone();
        let end = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        product.end_date = Some(end);

        let dates = ProductDates::resolve(&product, today());
        assert_eq!(dates.valid_end, end);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2020-01-31"),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert!(parse_date("2020-02-30").is_none());
        assert!(parse_date("01/31/2020").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_zero_length_range() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        assert_eq!(DateRange::new(day, day).num_days(), 0);
    }
}
