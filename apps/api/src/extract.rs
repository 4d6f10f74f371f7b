use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejection is an `AppError`, so bad bodies answer
/// 400 `VALIDATION_ERROR` in the shared error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
