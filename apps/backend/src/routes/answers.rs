//! Answer submission endpoint

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::AuthenticatedUser;
use crate::AppState;

/// POST /api/topics/:topic_id/items/:item_id/answer
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((topic_id, item_id)): Path<(String, String)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    let outcome = state
        .submissions
        .submit(&auth.user_id, &topic_id, &item_id, &payload.answer)
        .await?;

    Ok(Json(SubmitAnswerResponse {
        correct: outcome.correct,
    }))
}
