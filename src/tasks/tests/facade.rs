use super::*;

async fn facade_with_states(states: &[TaskState]) -> (TaskFacade<TaskQueue>, Vec<String>) {
    let (queue, ids) = queue_with_states(states).await;
    (TaskFacade::new(TaskDomain::Copy, queue), ids)
}

#[tokio::test]
async fn test_pending_succeeded_failed_lifecycle() {
    let (facade, ids) =
        facade_with_states(&[TaskState::Pending, TaskState::Succeeded, TaskState::Failed]).await;
    let (pending, succeeded, failed) = (ids[0].as_str(), ids[1].as_str(), ids[2].as_str());

    assert_eq!(record_ids(&facade.undone().await), vec![pending]);
    assert_eq!(record_ids(&facade.done().await), vec![succeeded, failed]);

    facade.clear_succeeded().await.unwrap();
    assert_eq!(record_ids(&facade.done().await), vec![failed]);

    facade.retry_all_failed().await.unwrap();
    assert!(facade.done().await.is_empty());
    assert_eq!(record_ids(&facade.undone().await), vec![pending, failed]);
}

#[tokio::test]
async fn test_clear_done_removes_all_finished_states() {
    let (facade, ids) = facade_with_states(&[
        TaskState::Canceled,
        TaskState::Running,
        TaskState::Failed,
        TaskState::Succeeded,
        TaskState::WaitingRetry,
    ])
    .await;

    facade.clear_done().await.unwrap();

    assert!(facade.done().await.is_empty());
    assert_eq!(
        record_ids(&facade.undone().await),
        vec![ids[1].as_str(), ids[4].as_str()]
    );
}

#[tokio::test]
async fn test_clear_by_custom_state_set() {
    let (facade, ids) =
        facade_with_states(&[TaskState::Errored, TaskState::Failing, TaskState::Running]).await;

    facade
        .clear_by_states(&[TaskState::Errored, TaskState::Failing])
        .await
        .unwrap();

    assert_eq!(record_ids(&facade.undone().await), vec![ids[2].as_str()]);
}

#[tokio::test]
async fn test_info_and_single_task_controls() {
    let (facade, ids) = facade_with_states(&[TaskState::Pending, TaskState::Failed]).await;

    assert_eq!(facade.info(&ids[0]).await.unwrap().id, ids[0]);
    assert!(matches!(facade.info("404").await, Err(Error::NotFound(_))));

    facade.cancel(&ids[0]).await.unwrap();
    assert_eq!(facade.info(&ids[0]).await.unwrap().state, TaskState::Canceled);

    facade.retry(&ids[1]).await.unwrap();
    assert_eq!(facade.info(&ids[1]).await.unwrap().state, TaskState::WaitingRetry);

    facade.remove(&ids[0]).await.unwrap();
    assert!(matches!(facade.info(&ids[0]).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_controls_on_missing_id_succeed() {
    let (facade, _ids) = facade_with_states(&[TaskState::Running]).await;

    facade.cancel("missing").await.unwrap();
    facade.remove("missing").await.unwrap();
    facade.retry("missing").await.unwrap();
    assert_eq!(facade.undone().await.len(), 1);
}

#[tokio::test]
async fn test_facade_usable_as_trait_object() {
    let (queue, ids) = queue_with_states(&[TaskState::Running]).await;
    let control: Arc<dyn TaskControl> = Arc::new(TaskFacade::new(TaskDomain::Upload, queue));

    assert_eq!(record_ids(&control.undone().await), vec![ids[0].as_str()]);
}

#[tokio::test]
async fn test_concurrent_queries_and_controls() {
    let (queue, ids) = queue_with_states(&[TaskState::Failed; 16]).await;
    let control: Arc<dyn TaskControl> = Arc::new(TaskFacade::new(TaskDomain::Upload, queue));

    let mut handles = Vec::new();
    for id in ids {
        let control = control.clone();
        handles.push(tokio::spawn(async move {
            control.retry(&id).await.unwrap();
            control.done().await.len()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap() < 16);
    }
    assert!(control.done().await.is_empty());
    assert_eq!(control.undone().await.len(), 16);
}

#[test]
fn test_facade_reports_domain() {
    let facade = TaskFacade::new(TaskDomain::OfflineDownload, Arc::new(TaskQueue::new()));
    assert_eq!(facade.domain(), TaskDomain::OfflineDownload);
}
