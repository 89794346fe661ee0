//! Global search API endpoint.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{ok, ApiResult};
use crate::errors::AppError;
use crate::models::{Project, Task, User};
use crate::search::{KIND_PROJECT, KIND_TASK, KIND_USER};
use crate::AppState;

/// Minimum query length; shorter queries are rejected, not silently emptied.
const MIN_QUERY_LEN: usize = 3;

const MAX_RESULTS: usize = 25;

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// Search results grouped per entity type, each list ranked by relevance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub users: Vec<User>,
}

/// GET /api/search?q= - Search tasks, projects and users.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchResults> {
    let query = params.q.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(AppError::Validation(format!(
            "Search query must be at least {} characters",
            MIN_QUERY_LEN
        )));
    }

    let hits = state.search.search(query, MAX_RESULTS)?;

    // Hydrate hits from the database; rows deleted since the last index
    // commit are dropped rather than surfaced as stale results.
    let mut results = SearchResults {
        tasks: Vec::new(),
        projects: Vec::new(),
        users: Vec::new(),
    };

    for hit in hits {
        match hit.kind.as_str() {
            KIND_TASK => {
                if let Some(task) = state.repo.get_task(&hit.entity_id).await? {
                    results.tasks.push(task);
                }
            }
            KIND_PROJECT => {
                if let Some(project) = state.repo.get_project(&hit.entity_id).await? {
                    results.projects.push(project);
                }
            }
            KIND_USER => {
                if let Some(user) = state.repo.get_user(&hit.entity_id).await? {
                    results.users.push(user);
                }
            }
            other => {
                tracing::warn!("Unknown search hit kind: {}", other);
            }
        }
    }

    ok(results)
}
