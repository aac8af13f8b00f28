use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::{Error, Result};

/// Today's date in the host's local time zone. Deployments set `TZ` to the
/// business zone so the date rolls over at local midnight.
pub fn business_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn earliest_service_start(today: NaiveDate, lead_days: i64) -> NaiveDate {
    today + Duration::days(lead_days)
}

/// One calendar month, first and last day inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let invalid = || Error::BadRequest(format!("Invalid calendar month: {}-{}", year, month));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let last = next.and_then(|d| d.pred_opt()).ok_or_else(invalid)?;
        Ok(Self {
            year,
            month,
            first,
            last,
        })
    }

    /// The requested month, defaulting each missing part to `today`'s.
    pub fn resolve(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> Result<Self> {
        Self::new(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_bounds() {
        let feb = MonthWindow::new(2028, 2).unwrap();
        assert_eq!(feb.first, date(2028, 2, 1));
        assert_eq!(feb.last, date(2028, 2, 29));
        assert_eq!(feb.days().count(), 29);

        let dec = MonthWindow::new(2026, 12).unwrap();
        assert_eq!(dec.last, date(2026, 12, 31));
    }

    #[test]
    fn rejects_impossible_months() {
        assert!(matches!(MonthWindow::new(2026, 0), Err(Error::BadRequest(_))));
        assert!(matches!(MonthWindow::new(2026, 13), Err(Error::BadRequest(_))));
        assert!(MonthWindow::new(i32::MAX, 12).is_err());
    }

    #[test]
    fn resolve_fills_missing_parts_from_today() {
        let today = date(2026, 10, 19);
        assert_eq!(MonthWindow::resolve(None, None, today).unwrap().month, 10);
        let w = MonthWindow::resolve(None, Some(3), today).unwrap();
        assert_eq!((w.year, w.month), (2026, 3));
    }

    #[test]
    fn lead_time_counts_from_the_given_day() {
        let today = date(2026, 10, 19);
        assert_eq!(earliest_service_start(today, 3), date(2026, 10, 22));
    }
}
