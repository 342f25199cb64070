/// API endpoint modules
pub mod address;
pub mod health;
pub mod mails;
pub mod sendbox;
pub mod sender;
pub mod settings;
pub mod statistics;

use axum::{Json, extract::rejection::JsonRejection};
use serde::Deserialize;
use tempmail_core::Page;

use crate::error::ApiError;

/// Query string shared by the list endpoints
///
/// Everything is kept as text; bad numbers fall back to the default page.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub query: Option<String>,
    pub address: Option<String>,
    pub keyword: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> Page {
        Page::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// Unwrap a JSON body, answering malformed input with a plain-text 400
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))
}
