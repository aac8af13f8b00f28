use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};

use crate::dto::calendar_dto::{CalendarEvent, CalendarResponse, DayAvailability};
use crate::models::customer_quote::{CustomerQuote, ServiceFrequency};
use crate::utils::time::MonthWindow;

pub const DAILY_CAPACITY: usize = 8;

const SERVICE_TITLE: &str = "Lawn Service";
const EVENT_TYPE: &str = "service";

/// Visit dates falling inside `window` for a service starting on `start`.
pub fn service_dates(
    start: NaiveDate,
    frequency: ServiceFrequency,
    window: &MonthWindow,
) -> Vec<NaiveDate> {
    let step = frequency.interval_days();
    let mut current = start;
    if start < window.first {
        let gap = (window.first - start).num_days();
        let skipped = (gap + step - 1) / step;
        current = start + Duration::days(skipped * step);
    }

    let mut dates = Vec::new();
    while current <= window.last {
        dates.push(current);
        current = current + Duration::days(step);
    }
    dates
}

fn visits<'a>(
    quotes: &'a [CustomerQuote],
    window: &'a MonthWindow,
) -> impl Iterator<Item = (&'a CustomerQuote, NaiveDate)> + 'a {
    quotes.iter().flat_map(move |quote| {
        let dates = match quote.service_start_date {
            Some(start) => service_dates(start, quote.frequency(), window),
            None => Vec::new(),
        };
        dates.into_iter().map(move |date| (quote, date))
    })
}

/// A customer's own visits for the month.
pub fn customer_calendar(window: &MonthWindow, quotes: &[CustomerQuote]) -> CalendarResponse {
    let mut events: Vec<CalendarEvent> = visits(quotes, window)
        .map(|(quote, date)| CalendarEvent {
            id: quote.id,
            date,
            title: SERVICE_TITLE.to_string(),
            address: quote.address.clone(),
            event_type: EVENT_TYPE.to_string(),
            status: quote.service_status.clone(),
            size: None,
            frequency: None,
        })
        .collect();
    events.sort_by_key(|e| (e.date, e.id));

    CalendarResponse {
        year: window.year,
        month: window.month,
        events,
        availability: None,
        total_services: None,
    }
}

/// Every visit for the month plus per-day crew capacity.
pub fn admin_calendar(window: &MonthWindow, quotes: &[CustomerQuote]) -> CalendarResponse {
    let mut events: Vec<CalendarEvent> = visits(quotes, window)
        .map(|(quote, date)| CalendarEvent {
            id: quote.id,
            date,
            title: quote.name.clone(),
            address: quote.address.clone(),
            event_type: EVENT_TYPE.to_string(),
            status: quote.service_status.clone(),
            size: Some(quote.actual_size),
            frequency: Some(quote.frequency().as_str().to_string()),
        })
        .collect();
    events.sort_by_key(|e| (e.date, e.id));

    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for event in &events {
        *per_day.entry(event.date).or_default() += 1;
    }

    let availability: BTreeMap<String, DayAvailability> = window
        .days()
        .map(|day| {
            let scheduled = per_day.get(&day).copied().unwrap_or(0);
            let status = if scheduled >= DAILY_CAPACITY { "full" } else { "available" };
            (
                day.to_string(),
                DayAvailability {
                    scheduled,
                    available: DAILY_CAPACITY.saturating_sub(scheduled),
                    capacity: DAILY_CAPACITY,
                    status: status.to_string(),
                },
            )
        })
        .collect();

    CalendarResponse {
        year: window.year,
        month: window.month,
        events,
        availability: Some(availability),
        total_services: Some(quotes.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduled(id: i64, start: NaiveDate, frequency: Option<&str>) -> CustomerQuote {
        CustomerQuote {
            id,
            user_id: Some(1),
            name: format!("Customer {}", id),
            email: None,
            address: format!("{} Main St, Bel Air, MD 21014", id),
            phone: "4105550100".into(),
            claimed_size: 1.0,
            actual_size: 1.0,
            size_verified: false,
            monthly_quote: Decimal::from(430),
            parcel_id: None,
            purchased: true,
            stripe_payment_id: Some(format!("cs_{}", id)),
            service_start_date: Some(start),
            service_frequency: frequency.map(str::to_string),
            service_status: "active".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn weekly_service_inside_month() {
        let window = MonthWindow::new(2026, 11).unwrap();
        let dates = service_dates(date(2026, 11, 3), ServiceFrequency::Weekly, &window);
        assert_eq!(
            dates,
            vec![date(2026, 11, 3), date(2026, 11, 10), date(2026, 11, 17), date(2026, 11, 24)]
        );
    }

    #[test]
    fn earlier_start_keeps_its_cadence() {
        let window = MonthWindow::new(2026, 11).unwrap();
        // Biweekly from Oct 20: Nov 3, Nov 17.
        let dates = service_dates(date(2026, 10, 20), ServiceFrequency::Biweekly, &window);
        assert_eq!(dates, vec![date(2026, 11, 3), date(2026, 11, 17)]);

        let dates = service_dates(date(2026, 10, 5), ServiceFrequency::Monthly, &window);
        assert_eq!(dates, vec![date(2026, 11, 4)]);
    }

    #[test]
    fn start_after_month_yields_nothing() {
        let window = MonthWindow::new(2026, 11).unwrap();
        assert!(service_dates(date(2026, 12, 1), ServiceFrequency::Weekly, &window).is_empty());
    }

    #[test]
    fn customer_view_is_sorted_and_defaults_to_weekly() {
        let window = MonthWindow::new(2026, 11).unwrap();
        let quotes = vec![
            scheduled(2, date(2026, 11, 20), Some("monthly")),
            scheduled(1, date(2026, 11, 27), None),
        ];
        let cal = customer_calendar(&window, &quotes);
        let got: Vec<(i64, NaiveDate)> = cal.events.iter().map(|e| (e.id, e.date)).collect();
        assert_eq!(got, vec![(2, date(2026, 11, 20)), (1, date(2026, 11, 27))]);
        assert_eq!(cal.events[0].title, "Lawn Service");
        assert!(cal.availability.is_none());

        let json = serde_json::to_value(&cal).unwrap();
        assert!(json.get("availability").is_none());
        assert_eq!(json["events"][0]["type"], "service");
        assert!(json["events"][0].get("size").is_none());
    }

    #[test]
    fn admin_view_tracks_capacity() {
        let window = MonthWindow::new(2026, 11).unwrap();
        let quotes: Vec<CustomerQuote> = (1..=9)
            .map(|id| scheduled(id, date(2026, 11, 2), Some("monthly")))
            .collect();
        let cal = admin_calendar(&window, &quotes);

        let availability = cal.availability.unwrap();
        assert_eq!(availability.len(), 30);
        let busy = &availability["2026-11-02"];
        assert_eq!(busy.scheduled, 9);
        assert_eq!(busy.available, 0);
        assert_eq!(busy.status, "full");
        let quiet = &availability["2026-11-03"];
        assert_eq!((quiet.scheduled, quiet.available), (0, DAILY_CAPACITY));
        assert_eq!(quiet.status, "available");

        assert_eq!(cal.total_services, Some(9));
        assert_eq!(cal.events[0].frequency.as_deref(), Some("monthly"));
        assert_eq!(cal.events[0].title, "Customer 1");
    }
}
