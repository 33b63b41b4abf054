//! Common test utilities for taskboard integration tests

use std::sync::Arc;
use std::time::{Duration, Instant};
use taskboard::{TaskControl, TaskQueue, TaskRecord, TaskState};
use tokio_util::sync::CancellationToken;

/// How a simulated worker should finish a task
#[derive(Clone, Copy, Debug)]
#[allow(dead_code)]
pub enum Outcome {
    /// Report success after the steps
    Succeed,
    /// Report failure after the steps
    Fail,
    /// Keep reporting progress until cancelled
    RunForever,
}

/// Start `id` on `queue` and drive it on a background task
///
/// Progress is reported every 10ms. A cancellation request stops the worker,
/// which then acknowledges through `TaskQueue::canceled`.
pub async fn spawn_worker(
    queue: Arc<TaskQueue>,
    id: String,
    outcome: Outcome,
) -> tokio::task::JoinHandle<()> {
    let token = queue
        .start(&id)
        .await
        .expect("task should be startable");

    tokio::spawn(async move {
        let mut step = 0u32;
        loop {
            if run_step(&token).await.is_err() {
                queue.canceled(&id).await;
                return;
            }
            step += 1;
            queue
                .report_progress(&id, f64::from(step.min(10) * 10), format!("step {step}"))
                .await;

            match outcome {
                Outcome::Succeed if step == 5 => return queue.succeed(&id).await,
                Outcome::Fail if step == 5 => {
                    return queue.fail(&id, "simulated failure").await;
                }
                _ => {}
            }
        }
    })
}

async fn run_step(token: &CancellationToken) -> Result<(), ()> {
    tokio::select! {
        _ = token.cancelled() => Err(()),
        _ = tokio::time::sleep(Duration::from_millis(10)) => Ok(()),
    }
}

/// Poll `control` until task `id` reaches `state`
pub async fn wait_for_state(
    control: &dyn TaskControl,
    id: &str,
    state: TaskState,
    timeout: Duration,
) -> TaskRecord {
    let start = Instant::now();
    loop {
        let record = control.info(id).await.expect("task should exist");
        if record.state == state {
            return record;
        }
        assert!(
            start.elapsed() < timeout,
            "task {id} stuck in {:?}, expected {state:?}",
            record.state
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
