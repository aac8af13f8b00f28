use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    /// Quote ID.
    pub id: i64,
    pub date: NaiveDate,
    pub title: String,
    pub address: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DayAvailability {
    pub scheduled: usize,
    pub available: usize,
    pub capacity: usize,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub events: Vec<CalendarEvent>,
    /// Admin view only, keyed by ISO date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<BTreeMap<String, DayAvailability>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_services: Option<usize>,
}
