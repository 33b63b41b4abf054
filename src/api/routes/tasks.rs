//! Task query and control handlers.
//!
//! Every route takes the task domain as its first path segment and resolves
//! it through the [`TaskRegistry`](crate::tasks::TaskRegistry); an unknown or
//! unregistered domain yields 404.

use super::TaskIdQuery;
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::tasks::TaskControl;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// `?tid=` extractor; rejections are reported as structured 400s
type TidQuery = std::result::Result<Query<TaskIdQuery>, QueryRejection>;

fn resolve(state: &AppState, domain: &str) -> Result<Arc<dyn TaskControl>> {
    state.tasks.resolve(domain)
}

fn require_tid(query: TidQuery) -> Result<String> {
    let Query(query) = query.map_err(|rejection| {
        Error::BadRequest(format!(
            "failed to parse query string: {}",
            rejection.body_text()
        ))
    })?;
    match query.tid {
        Some(tid) if !tid.is_empty() => Ok(tid),
        _ => Err(Error::BadRequest("missing 'tid' query parameter".to_string())),
    }
}

fn no_content(result: Result<()>, domain: &str, action: &str) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, domain, action, "Task request failed");
            e.into_response()
        }
    }
}

/// GET /task/:domain/undone - List tasks still in progress
#[utoipa::path(
    get,
    path = "/task/{domain}/undone",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain: upload, copy, offline_download, offline_download_transfer")
    ),
    responses(
        (status = 200, description = "Unfinished tasks in manager order", body = Vec<crate::types::TaskRecord>),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn list_undone(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    match resolve(&state, &domain) {
        Ok(control) => (StatusCode::OK, Json(control.undone().await)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /task/:domain/done - List finished tasks
#[utoipa::path(
    get,
    path = "/task/{domain}/done",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain")
    ),
    responses(
        (status = 200, description = "Finished tasks in manager order", body = Vec<crate::types::TaskRecord>),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn list_done(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    match resolve(&state, &domain) {
        Ok(control) => (StatusCode::OK, Json(control.done().await)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /task/:domain/info?tid= - Get one task
#[utoipa::path(
    post,
    path = "/task/{domain}/info",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain"),
        TaskIdQuery
    ),
    responses(
        (status = 200, description = "Task record", body = crate::types::TaskRecord),
        (status = 400, description = "Missing tid", body = crate::error::ApiError),
        (status = 404, description = "Unknown task or domain", body = crate::error::ApiError)
    )
)]
pub async fn task_info(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    query: TidQuery,
) -> Response {
    let result = async {
        let control = resolve(&state, &domain)?;
        let tid = require_tid(query)?;
        control.info(&tid).await
    }
    .await;

    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /task/:domain/cancel?tid= - Request cancellation of a task
#[utoipa::path(
    post,
    path = "/task/{domain}/cancel",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain"),
        TaskIdQuery
    ),
    responses(
        (status = 204, description = "Cancellation requested (also for unknown or finished tasks)"),
        (status = 400, description = "Missing tid", body = crate::error::ApiError),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn cancel_task(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    query: TidQuery,
) -> Response {
    let result = async {
        let control = resolve(&state, &domain)?;
        control.cancel(&require_tid(query)?).await
    }
    .await;
    no_content(result, &domain, "cancel")
}

/// POST /task/:domain/delete?tid= - Remove a task
#[utoipa::path(
    post,
    path = "/task/{domain}/delete",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain"),
        TaskIdQuery
    ),
    responses(
        (status = 204, description = "Task removed (also for unknown tasks)"),
        (status = 400, description = "Missing tid", body = crate::error::ApiError),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    query: TidQuery,
) -> Response {
    let result = async {
        let control = resolve(&state, &domain)?;
        control.remove(&require_tid(query)?).await
    }
    .await;
    no_content(result, &domain, "delete")
}

/// POST /task/:domain/retry?tid= - Re-queue a failed task
#[utoipa::path(
    post,
    path = "/task/{domain}/retry",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain"),
        TaskIdQuery
    ),
    responses(
        (status = 204, description = "Retry requested (ignored for tasks that are not failed)"),
        (status = 400, description = "Missing tid", body = crate::error::ApiError),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn retry_task(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    query: TidQuery,
) -> Response {
    let result = async {
        let control = resolve(&state, &domain)?;
        control.retry(&require_tid(query)?).await
    }
    .await;
    no_content(result, &domain, "retry")
}

/// POST /task/:domain/clear_done - Remove every finished task
#[utoipa::path(
    post,
    path = "/task/{domain}/clear_done",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain")
    ),
    responses(
        (status = 204, description = "Finished tasks removed"),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn clear_done(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    let result = async { resolve(&state, &domain)?.clear_done().await }.await;
    no_content(result, &domain, "clear_done")
}

/// POST /task/:domain/clear_succeeded - Remove every succeeded task
#[utoipa::path(
    post,
    path = "/task/{domain}/clear_succeeded",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain")
    ),
    responses(
        (status = 204, description = "Succeeded tasks removed"),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn clear_succeeded(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    let result = async { resolve(&state, &domain)?.clear_succeeded().await }.await;
    no_content(result, &domain, "clear_succeeded")
}

/// POST /task/:domain/retry_failed - Re-queue every failed task
#[utoipa::path(
    post,
    path = "/task/{domain}/retry_failed",
    tag = "tasks",
    params(
        ("domain" = String, Path, description = "Task domain")
    ),
    responses(
        (status = 204, description = "Failed tasks re-queued"),
        (status = 404, description = "Unknown task domain", body = crate::error::ApiError)
    )
)]
pub async fn retry_failed(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    let result = async { resolve(&state, &domain)?.retry_all_failed().await }.await;
    no_content(result, &domain, "retry_failed")
}
