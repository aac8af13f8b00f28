pub mod customer_quote;
pub mod user;
