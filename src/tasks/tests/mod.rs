use super::*;
use crate::types::TaskDomain;

mod facade;

/// Plain task with fixed values, for projection tests
#[derive(Clone, Debug)]
struct FakeTask {
    id: &'static str,
    state: TaskState,
    progress: f64,
    error: Option<&'static str>,
}

impl FakeTask {
    fn new(id: &'static str, state: TaskState) -> Self {
        Self {
            id,
            state,
            progress: 0.0,
            error: None,
        }
    }
}

impl TaskLike for FakeTask {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> String {
        format!("fake {}", self.id)
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn status(&self) -> String {
        format!("{:?}", self.state).to_lowercase()
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn error(&self) -> Option<String> {
        self.error.map(str::to_string)
    }
}

/// Queue holding one task per given state, in order; returns the IDs
async fn queue_with_states(states: &[TaskState]) -> (Arc<TaskQueue>, Vec<String>) {
    let queue = Arc::new(TaskQueue::new());
    let mut ids = Vec::new();
    for (i, state) in states.iter().enumerate() {
        let id = queue.submit(format!("task-{i}")).await;
        queue.set_state(&id, *state).await;
        ids.push(id);
    }
    (queue, ids)
}

fn record_ids(records: &[TaskRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

// --- project() ---

#[test]
fn test_project_copies_every_field() {
    let mut task = FakeTask::new("7", TaskState::Failed);
    task.progress = 42.5;
    task.error = Some("connection reset");

    let record = project(&task);
    assert_eq!(
        record,
        TaskRecord {
            id: "7".to_string(),
            name: "fake 7".to_string(),
            state: TaskState::Failed,
            status: "failed".to_string(),
            progress: 42.5,
            error: "connection reset".to_string(),
        }
    );
}

#[test]
fn test_project_nan_progress_becomes_100() {
    let mut task = FakeTask::new("1", TaskState::Succeeded);
    task.progress = f64::NAN;

    assert_eq!(project(&task).progress, 100.0);
}

#[test]
fn test_project_missing_error_is_empty_string() {
    let task = FakeTask::new("1", TaskState::Running);
    assert_eq!(project(&task).error, "");
}

#[test]
fn test_project_is_pure() {
    let mut task = FakeTask::new("3", TaskState::Errored);
    task.progress = f64::NAN;
    task.error = Some("boom");

    assert_eq!(project(&task), project(&task));
}

#[test]
fn test_project_through_arc() {
    let task = Arc::new(FakeTask::new("9", TaskState::Pending));
    assert_eq!(project(&task).id, "9");
}

// --- query_by_states() / get_by_id() ---

#[tokio::test]
async fn test_undone_and_done_partition_every_task() {
    let (queue, ids) = queue_with_states(&TaskState::ALL).await;

    let undone = query_by_states(queue.as_ref(), &TaskState::UNFINISHED).await;
    let done = query_by_states(queue.as_ref(), &TaskState::FINISHED).await;

    let mut seen: Vec<&str> = record_ids(&undone);
    seen.extend(record_ids(&done));
    seen.sort_unstable();
    let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
    expected.sort_unstable();

    assert_eq!(seen, expected, "every task must appear exactly once");
    assert!(undone.iter().all(|r| !r.state.is_finished()));
    assert!(done.iter().all(|r| r.state.is_finished()));
}

#[tokio::test]
async fn test_query_keeps_manager_order() {
    let (queue, ids) = queue_with_states(&[
        TaskState::Failed,
        TaskState::Running,
        TaskState::Succeeded,
        TaskState::Canceled,
    ])
    .await;

    let done = query_by_states(queue.as_ref(), &TaskState::FINISHED).await;
    assert_eq!(record_ids(&done), vec![ids[0].as_str(), ids[2].as_str(), ids[3].as_str()]);
}

#[tokio::test]
async fn test_get_by_id_returns_requested_task() {
    let (queue, ids) = queue_with_states(&[TaskState::Pending, TaskState::Running]).await;

    let record = get_by_id(queue.as_ref(), &ids[1]).await.unwrap();
    assert_eq!(record.id, ids[1]);
    assert_eq!(record.state, TaskState::Running);
}

#[tokio::test]
async fn test_get_by_id_unknown_is_not_found() {
    let (queue, _ids) = queue_with_states(&[TaskState::Pending]).await;

    let err = get_by_id(queue.as_ref(), "nope").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref what) if what.contains("nope")));
}

#[tokio::test]
async fn test_registry_resolves_registered_domains_only() {
    let registry = TaskRegistry::new()
        .register(TaskDomain::Upload, Arc::new(TaskQueue::new()))
        .register(TaskDomain::Copy, Arc::new(TaskQueue::new()));

    assert_eq!(registry.domains(), vec![TaskDomain::Upload, TaskDomain::Copy]);
    assert!(registry.resolve("upload").is_ok());
    assert!(matches!(
        registry.resolve("offline_download"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(registry.resolve("bogus"), Err(Error::NotFound(_))));
}
