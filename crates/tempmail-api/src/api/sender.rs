/// Send permission endpoints
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Serialize;
use std::sync::Arc;
use tempmail_core::sender::{SenderPermission, SenderUpdate};
use tempmail_core::{ListResponse, collections};

use super::{ListParams, json_body};
use crate::{context::ApiContext, error::ApiError};

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
}

/// `GET /admin/address_sender`
pub async fn list(
    State(ctx): State<Arc<ApiContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let response = collections::address_senders(params.address.as_deref())
        .execute(ctx.db.as_ref(), params.page())
        .await?;
    Ok(Json(response))
}

/// `POST /admin/address_sender`
pub async fn update(
    State(ctx): State<Arc<ApiContext>>,
    payload: Result<Json<SenderUpdate>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let update = json_body(payload)?;

    SenderPermission::new(ctx.db.as_ref(), ctx.notifier.as_ref())
        .update(&update)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Internal(_) => {
                ApiError::Internal("Failed to update address sender".to_string())
            }
            other => other,
        })?;

    Ok(Json(UpdateResponse { success: true }))
}
