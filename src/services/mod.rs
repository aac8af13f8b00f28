pub mod billing_service;
pub mod calendar;
pub mod parcel_service;
pub mod pricing;
pub mod quote_service;
pub mod user_service;
