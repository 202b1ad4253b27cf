//! Extractors whose rejections use the API error body

use axum::extract::{FromRequest, FromRequestParts};

use crate::api::error::ErrorResponse;

/// `Json` that rejects with a `bad_request` [`ErrorResponse`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ErrorResponse))]
pub struct ApiJson<T>(pub T);

/// `Query` that rejects with a `bad_request` [`ErrorResponse`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ErrorResponse))]
pub struct ApiQuery<T>(pub T);

/// `Path` that rejects with a `bad_request` [`ErrorResponse`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ErrorResponse))]
pub struct ApiPath<T>(pub T);
