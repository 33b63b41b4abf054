//! # taskboard
//!
//! Monitoring and control of background task queues over HTTP, plus a small
//! keyed metadata store backed by a CSV or JSON file.
//!
//! ## Overview
//!
//! - **Task domains** - each [`TaskDomain`] (uploads, copies, offline
//!   downloads, transfers) is served by its own [`TaskManager`]
//! - **Uniform view** - every manager's tasks are projected to the same
//!   [`TaskRecord`] shape, whatever the concrete task type
//! - **Fire-and-forget control** - cancel, remove and retry hand the request
//!   to the manager and return immediately
//! - **Metadata store** - per-file records keyed by (path, name), rewritten
//!   atomically on every change
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard::{Config, TaskDomain, TaskQueue, TaskRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let uploads = Arc::new(TaskQueue::new());
//!     uploads.submit("holiday.mp4").await;
//!
//!     let tasks = Arc::new(TaskRegistry::new().register(TaskDomain::Upload, uploads));
//!     let config = Arc::new(Config::default());
//!
//!     // Serve until SIGTERM / Ctrl+C
//!     taskboard::run_with_shutdown(tasks, config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Keyed metadata store
pub mod metadata;
/// Task projection, queries and control
pub mod tasks;
/// Core types
pub mod types;

use std::sync::Arc;

// Re-export commonly used types
pub use config::{ApiConfig, Config, MetadataConfig, StoreFormat};
pub use error::{ApiError, Error, ErrorDetail, Result, StoreError, ToHttpStatus};
pub use metadata::MetadataStore;
pub use tasks::{
    BackgroundTask, TaskControl, TaskFacade, TaskLike, TaskManager, TaskQueue, TaskRegistry,
    get_by_id, project, query_by_states,
};
pub use types::{MetadataEntry, TaskDomain, TaskRecord, TaskState};

/// Run the API server until a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// In-flight requests finish before this returns.
pub async fn run_with_shutdown(tasks: Arc<TaskRegistry>, config: Arc<Config>) -> Result<()> {
    api::serve_with_shutdown(tasks, config, wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
