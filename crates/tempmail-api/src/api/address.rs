/// Address endpoints
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempmail_core::address::CascadeStep;
use tempmail_core::{ListResponse, collections};
use tracing::info;

use super::{ListParams, json_body};
use crate::{context::ApiContext, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct NewAddressRequest {
    pub name: Option<String>,
    pub domain: Option<String>,
    #[serde(
        rename = "enablePrefix",
        default,
        deserialize_with = "tempmail_core::sender::deserialize_truthy"
    )]
    pub enable_prefix: bool,
}

#[derive(Debug, Serialize)]
pub struct NewAddressResponse {
    pub jwt: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub jwt: String,
}

/// `GET /admin/address`
pub async fn list(
    State(ctx): State<Arc<ApiContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let response = collections::addresses(params.query.as_deref())
        .execute(ctx.db.as_ref(), params.page())
        .await?;
    Ok(Json(response))
}

/// `POST /admin/new_address`
pub async fn create(
    State(ctx): State<Arc<ApiContext>>,
    payload: Result<Json<NewAddressRequest>, JsonRejection>,
) -> Result<Json<NewAddressResponse>, ApiError> {
    let req = json_body(payload)?;
    let name = req.name.as_deref().unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Please provide a name".to_string()));
    }

    let created = ctx
        .lifecycle()
        .create(name, req.domain.as_deref(), req.enable_prefix)
        .await?;
    let jwt = ctx.issuer.sign(&created.address, created.id)?;

    Ok(Json(NewAddressResponse {
        jwt,
        address: created.address,
    }))
}

/// `DELETE /admin/delete_address/{id}`
pub async fn delete(
    State(ctx): State<Arc<ApiContext>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let report = ctx.lifecycle().delete(id).await?;

    match report.failed_primary_step() {
        None => {
            info!(address_id = id, "Address deleted");
            Ok(Json(DeleteResponse {
                success: report.success(),
            }))
        }
        Some(CascadeStep::Address) => Err(ApiError::Internal("Failed to delete address".to_string())),
        Some(_) => Err(ApiError::Internal("Failed to delete mails".to_string())),
    }
}

/// `GET /admin/show_password/{id}`
pub async fn show_password(
    State(ctx): State<Arc<ApiContext>>,
    Path(id): Path<i64>,
) -> Result<Json<TokenResponse>, ApiError> {
    let jwt = ctx.issuer.issue(ctx.db.as_ref(), id).await?;
    Ok(Json(TokenResponse { jwt }))
}
