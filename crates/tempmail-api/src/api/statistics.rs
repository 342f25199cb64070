/// Statistics endpoint
use axum::{Json, extract::State};
use std::sync::Arc;
use tempmail_core::statistics::{self, Statistics};

use crate::context::ApiContext;

/// `GET /admin/statistics`
pub async fn get(State(ctx): State<Arc<ApiContext>>) -> Json<Statistics> {
    Json(statistics::collect(ctx.db.as_ref()).await)
}
