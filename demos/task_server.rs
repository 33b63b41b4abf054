//! Task server demo
//!
//! Serves one simulated queue per task domain plus a seeded metadata store.
//! Every few seconds a worker advances the queued tasks; some of them fail so
//! the retry routes have something to act on.
//!
//! Run with:
//! ```bash
//! cargo run --example task_server [config.json]
//! ```
//!
//! Then try:
//! ```bash
//! curl http://127.0.0.1:5244/task/upload/undone
//! curl -X POST 'http://127.0.0.1:5244/task/upload/cancel?tid=2'
//! curl http://127.0.0.1:5244/metadata
//! ```

use std::sync::Arc;
use std::time::Duration;
use taskboard::{
    Config, MetadataEntry, MetadataStore, TaskDomain, TaskLike, TaskManager, TaskQueue,
    TaskRegistry, TaskState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    seed_metadata(&MetadataStore::from_config(&config.metadata)).await?;

    let mut registry = TaskRegistry::new();
    for domain in TaskDomain::ALL {
        let queue = Arc::new(TaskQueue::new());
        for n in 1..=4 {
            queue.submit(format!("{domain}-{n}.bin")).await;
        }
        tokio::spawn(run_worker(domain, queue.clone()));
        registry = registry.register(domain, queue);
    }

    taskboard::run_with_shutdown(Arc::new(registry), Arc::new(config)).await?;
    Ok(())
}

async fn seed_metadata(store: &MetadataStore) -> taskboard::Result<()> {
    if store.list_all().await.is_ok() {
        return Ok(());
    }
    for (path, name) in [("/photos", "beach.jpg"), ("/photos", "city.jpg"), ("/docs", "cv.pdf")] {
        store.append(MetadataEntry::new(path, name)).await?;
    }
    tracing::info!(path = %store.path().display(), "Seeded metadata store");
    Ok(())
}

/// Runs every startable task of `queue` one after another
///
/// Every third task fails on its first attempt.
async fn run_worker(domain: TaskDomain, queue: Arc<TaskQueue>) {
    let mut attempts = std::collections::HashMap::<String, u32>::new();

    loop {
        tokio::time::sleep(Duration::from_secs(2)).await;

        let waiting = queue
            .get_by_state(&[TaskState::Pending, TaskState::WaitingRetry])
            .await;
        for id in waiting.iter().map(|t| t.id().to_string()) {
            let Some(token) = queue.start(&id).await else {
                continue;
            };
            let attempt = attempts.entry(id.clone()).or_insert(0);
            *attempt += 1;

            for step in 1..=10u32 {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(300)) => {
                        queue
                            .report_progress(&id, f64::from(step * 10), format!("step {step}/10"))
                            .await;
                    }
                }
            }

            if token.is_cancelled() {
                queue.canceled(&id).await;
                tracing::info!(%domain, task_id = %id, "Task canceled");
            } else if *attempt == 1 && id.parse::<u32>().unwrap_or(0) % 3 == 0 {
                queue.fail(&id, "simulated transfer error").await;
                tracing::info!(%domain, task_id = %id, "Task failed");
            } else {
                queue.succeed(&id).await;
                tracing::info!(%domain, task_id = %id, "Task succeeded");
            }
        }
    }
}
