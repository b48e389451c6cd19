//! Rolling month window used to decide which articles are recent enough.

use crate::error::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Inclusive lower date bound computed from a reference date.
///
/// `months_back = 0` keeps only the reference date's calendar month;
/// `months_back = 2` also keeps the two months before it, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    reference_date: NaiveDate,
    months_back: u32,
    boundary: NaiveDate,
}

impl DateWindow {
    /// Build the window for a run.
    ///
    /// # Arguments
    ///
    /// * `reference_date` - "Today" for the run
    /// * `months_back` - Whole months before the reference month to include
    ///
    /// # Returns
    ///
    /// The window, or [`Error::InvalidParameter`] if `months_back` is
    /// negative or reaches before the calendar's range.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let window = DateWindow::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 1)?;
    /// assert_eq!(window.boundary(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    /// ```
    pub fn new(reference_date: NaiveDate, months_back: i64) -> Result<Self> {
        let months_back = u32::try_from(months_back).map_err(|_| {
            Error::InvalidParameter(format!(
                "months_back must be a non-negative month count, got {months_back}"
            ))
        })?;
        let boundary = boundary(reference_date, months_back)?;
        Ok(Self {
            reference_date,
            months_back,
            boundary,
        })
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn months_back(&self) -> u32 {
        self.months_back
    }

    /// First day of the oldest month in the window.
    pub fn boundary(&self) -> NaiveDate {
        self.boundary
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        in_window(date, self.boundary)
    }
}

/// First day of the month `months_back` months before `reference_date`'s month.
pub fn boundary(reference_date: NaiveDate, months_back: u32) -> Result<NaiveDate> {
    reference_date
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months_back)))
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "{months_back} months before {reference_date} is outside the calendar"
            ))
        })
}

pub fn in_window(article_date: NaiveDate, boundary: NaiveDate) -> bool {
    article_date >= boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_months_is_current_month() {
        assert_eq!(boundary(date(2024, 5, 17), 0).unwrap(), date(2024, 5, 1));
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(boundary(date(2024, 1, 15), 1).unwrap(), date(2023, 12, 1));
        assert_eq!(boundary(date(2024, 3, 31), 14).unwrap(), date(2023, 1, 1));
    }

    #[test]
    fn test_boundary_always_first_of_month_and_before_reference() {
        let reference = date(2024, 7, 31);
        for months in 0..40 {
            let b = boundary(reference, months).unwrap();
            assert_eq!(b.day(), 1);
            if months > 0 {
                assert!(b < reference);
                assert!(b < date(2024, 7, 1));
            } else {
                assert_eq!(b, date(2024, 7, 1));
            }
        }
    }

    #[test]
    fn test_negative_months_rejected() {
        let err = DateWindow::new(date(2024, 5, 1), -1).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_boundary_date_is_inclusive() {
        let window = DateWindow::new(date(2024, 5, 10), 0).unwrap();
        assert!(window.contains(date(2024, 5, 1)));
        assert!(window.contains(date(2024, 5, 10)));
        assert!(!window.contains(date(2024, 4, 30)));
        assert_eq!(window.months_back(), 0);
    }
}
