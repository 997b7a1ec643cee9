//! Request extractors with the application's error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejections render as [`AppError::BadRequest`].
///
/// Axum's stock `Json` rejection leaks serde messages naming internal types;
/// this one goes through `AppError`'s sanitizer instead.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
