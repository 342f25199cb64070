/// Account settings endpoints (address and send block-lists)
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tempmail_core::{AccountSettings, SettingsStore};
use tracing::error;

use super::json_body;
use crate::{context::ApiContext, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    #[serde(rename = "blockList")]
    pub block_list: Option<Vec<String>>,
    #[serde(rename = "sendBlockList")]
    pub send_block_list: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SaveSettingsResponse {
    pub success: bool,
}

/// `GET /admin/account_settings`
///
/// Any failure degrades to an empty object.
pub async fn get(State(ctx): State<Arc<ApiContext>>) -> Response {
    let store = SettingsStore::new(ctx.db.as_ref());
    match AccountSettings::load(&store).await {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load account settings");
            Json(json!({})).into_response()
        }
    }
}

/// `POST /admin/account_settings`
pub async fn save(
    State(ctx): State<Arc<ApiContext>>,
    payload: Result<Json<SaveSettingsRequest>, JsonRejection>,
) -> Result<Json<SaveSettingsResponse>, ApiError> {
    let req = json_body(payload)?;
    let store = SettingsStore::new(ctx.db.as_ref());

    AccountSettings::save(&store, req.block_list, req.send_block_list).await?;

    Ok(Json(SaveSettingsResponse { success: true }))
}
