//! Metadata store handlers.

use super::DeleteMetadataRequest;
use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /metadata - List all metadata entries
#[utoipa::path(
    get,
    path = "/metadata",
    tag = "metadata",
    responses(
        (status = 200, description = "All entries in file order, as objects with fileName, filePath and any auxiliary fields"),
        (status = 500, description = "Store missing or malformed", body = crate::error::ApiError)
    )
)]
pub async fn list_metadata(State(state): State<AppState>) -> Response {
    match state.metadata.list_all().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list metadata");
            e.into_response()
        }
    }
}

/// POST /metadata/delete - Delete every entry with the given file path and name
#[utoipa::path(
    post,
    path = "/metadata/delete",
    tag = "metadata",
    request_body = DeleteMetadataRequest,
    responses(
        (status = 204, description = "Entries deleted, or none matched"),
        (status = 400, description = "Malformed request body", body = crate::error::ApiError),
        (status = 500, description = "Store unreadable or unwritable", body = crate::error::ApiError)
    )
)]
pub async fn delete_metadata(
    State(state): State<AppState>,
    body: Result<Json<DeleteMetadataRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return Error::BadRequest(format!(
                "failed to parse request body: {}",
                rejection.body_text()
            ))
            .into_response();
        }
    };

    match state
        .metadata
        .delete_by_key(&request.file_path, &request.file_name)
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete metadata entry");
            e.into_response()
        }
    }
}
