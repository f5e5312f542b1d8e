//! Request extractors that report failures in the API error format.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ServerError;

/// JSON body extractor. Malformed bodies, unknown fields and missing fields
/// become `validation_error` responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// Path extractor. Unparseable ids are reported as not found.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct ApiPath<T>(pub T);
