//! App name listing.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use super::HandlerContext;
use crate::Result;

/// List live app names, one inner array per credential.
pub async fn list(State(ctx): State<HandlerContext>) -> Result<Json<Vec<Vec<String>>>> {
    let groups = ctx.repository.list_app_names_grouped().await?;
    debug!(credentials = groups.len(), "listed app names");
    Ok(Json(groups))
}
