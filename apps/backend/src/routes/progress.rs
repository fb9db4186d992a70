//! Progress endpoints: ring, checklist, reset and overview

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use skilldrill_core::{LedgerKey, ResetScope};

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::AuthenticatedUser;
use crate::AppState;

/// GET /api/topics/:topic_id/ring
pub async fn ring(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(topic_id): Path<String>,
) -> Result<Json<RingResponse>> {
    let key = LedgerKey::new(auth.user_id, topic_id);
    let ring = state.progress.ring(&key).await?;
    Ok(Json(ring.into()))
}

/// GET /api/topics/:topic_id/checklist?items=a,b,c
pub async fn checklist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(topic_id): Path<String>,
    Query(query): Query<ChecklistQuery>,
) -> Result<Json<Vec<bool>>> {
    let key = LedgerKey::new(auth.user_id, topic_id);
    let checklist = state.progress.checklist(&key, query.item_ids()).await?;
    Ok(Json(checklist))
}

/// DELETE /api/progress/:scope
///
/// `scope` is a topic id, or `all` for every topic.
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(scope): Path<String>,
) -> Result<Json<ResetResponse>> {
    let scope = ResetScope::parse(&scope);
    let ledgers = state.progress.reset(&auth.user_id, &scope).await?;

    Ok(Json(ResetResponse {
        reset: true,
        ledgers,
    }))
}

/// GET /api/progress
pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<TopicProgress>>> {
    let overview = state.progress.overview(&auth.user_id).await?;
    Ok(Json(overview))
}
