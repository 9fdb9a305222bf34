//! Request extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` for request bodies, but malformed or mistyped JSON becomes
/// an [`AppError::BadRequest`] with the usual `{ error, code }` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
