//! Topic listing endpoint

use axum::{extract::State, Json};

use crate::models::TopicSummary;
use crate::AppState;

/// GET /api/topics
///
/// Canonical answers are never exposed here.
pub async fn list(State(state): State<AppState>) -> Json<Vec<TopicSummary>> {
    let topics = state
        .catalog
        .topics()
        .map(|topic| TopicSummary {
            id: topic.id.clone(),
            title: topic.title.clone(),
            item_ids: topic.item_ids(),
        })
        .collect();

    Json(topics)
}
