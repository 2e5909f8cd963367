/// Request extractors
///
/// [`ApiJson`] is `axum::Json` with rejections routed through [`ApiError`],
/// so a malformed body yields the usual `{error, message}` 400 response
/// instead of axum's plain-text 415/422.

use axum::extract::FromRequest;

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
