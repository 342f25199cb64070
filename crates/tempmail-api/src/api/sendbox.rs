/// Sent mail endpoint
use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tempmail_core::{ListResponse, collections};

use super::ListParams;
use crate::{context::ApiContext, error::ApiError};

/// `GET /admin/sendbox`
pub async fn list(
    State(ctx): State<Arc<ApiContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let response = collections::sendbox(params.address.as_deref())
        .execute(ctx.db.as_ref(), params.page())
        .await?;
    Ok(Json(response))
}
