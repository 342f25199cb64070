/// Inbound mail endpoints
use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tempmail_core::{ListResponse, collections};

use super::ListParams;
use crate::{context::ApiContext, error::ApiError};

/// `GET /admin/mails`
pub async fn list(
    State(ctx): State<Arc<ApiContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let response = collections::mails(params.address.as_deref(), params.keyword.as_deref())
        .execute(ctx.db.as_ref(), params.page())
        .await?;
    Ok(Json(response))
}

/// `GET /admin/mails_unknow` - mail whose address no longer exists
pub async fn unknown(
    State(ctx): State<Arc<ApiContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let response = collections::unknown_mails()
        .execute(ctx.db.as_ref(), params.page())
        .await?;
    Ok(Json(response))
}
