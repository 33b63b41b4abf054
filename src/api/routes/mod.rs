//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`tasks`] - Task queries and control, per task domain
//! - [`metadata`] - Metadata store
//! - [`system`] - Health and OpenAPI

use serde::{Deserialize, Serialize};

mod metadata;
mod system;
mod tasks;

pub use metadata::*;
pub use system::*;
pub use tasks::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for single-task operations
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskIdQuery {
    /// Task ID
    pub tid: Option<String>,
}

/// Request body for POST /metadata/delete
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMetadataRequest {
    /// Directory path of the file
    pub file_path: String,
    /// File name
    pub file_name: String,
}
