//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the taskboard REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the taskboard REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "taskboard REST API",
        version = "0.1.0",
        description = "Monitoring and control of background task queues, plus the file metadata store",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5244", description = "Local development server")
    ),
    paths(
        // Tasks
        crate::api::routes::list_undone,
        crate::api::routes::list_done,
        crate::api::routes::task_info,
        crate::api::routes::cancel_task,
        crate::api::routes::delete_task,
        crate::api::routes::retry_task,
        crate::api::routes::clear_done,
        crate::api::routes::clear_succeeded,
        crate::api::routes::retry_failed,

        // Metadata
        crate::api::routes::list_metadata,
        crate::api::routes::delete_metadata,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::TaskState,
        crate::types::TaskRecord,
        crate::types::TaskDomain,

        crate::api::routes::TaskIdQuery,
        crate::api::routes::DeleteMetadataRequest,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Task queues - Query, cancel, retry and clear tasks per domain"),
        (name = "metadata", description = "Metadata store - List and delete per-file records"),
        (name = "system", description = "System endpoints - Health checks and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
