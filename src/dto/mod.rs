pub mod auth_dto;
pub mod billing_dto;
pub mod calendar_dto;
pub mod quote_dto;
