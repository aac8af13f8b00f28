use axum::extract::FromRequest;

use crate::error::Error;

/// `axum::Json` whose rejections render through [`Error`], so a missing
/// field or wrong type is a 400 JSON body like every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);
