//! In-memory integration tests for the task store contract.

use chrono::Duration;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use taskwork::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, PersistedTaskData, Task, TaskId, TaskStatus, UnsavedTask},
    ports::{TaskRepository, TaskRepositoryError},
};

#[fixture]
fn repository() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn unsaved(title: &str) -> UnsavedTask {
    UnsavedTask::pending(NewTask::new(title), &DefaultClock)
}

fn with_updated_at(task: &Task, shift: Duration) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: task.id(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status(),
        created_at: task.created_at(),
        updated_at: task.updated_at() + shift,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_assigns_sequential_ids_from_one(repository: InMemoryTaskRepository) {
    let first = repository.create(&unsaved("a")).await.expect("create a");
    let second = repository.create(&unsaved("b")).await.expect("create b");

    assert_eq!(first.id().value(), 1);
    assert_eq!(second.id().value(), 2);
    assert_eq!(first.status(), TaskStatus::Pending);
    assert_eq!(
        repository.find_by_id(first.id()).await.expect("lookup"),
        Some(first)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_replaces_status_and_timestamp(repository: InMemoryTaskRepository) {
    let mut task = repository.create(&unsaved("update me")).await.expect("create");
    task.transition_to(TaskStatus::Processing, &DefaultClock)
        .expect("pending -> processing");

    repository.update(&task).await.expect("update");

    let stored = repository
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task should exist");
    assert_eq!(stored.status(), TaskStatus::Processing);
    assert_eq!(stored.updated_at(), task.updated_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_unknown_task_is_not_found(repository: InMemoryTaskRepository) {
    let ghost = unsaved("ghost").into_task(TaskId::new(77).expect("valid task id"));

    let result = repository.update(&ghost).await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == ghost.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_moving_timestamp_backward_is_stale(repository: InMemoryTaskRepository) {
    let created = repository.create(&unsaved("stale")).await.expect("create");
    let newer = with_updated_at(&created, Duration::seconds(10));
    repository.update(&newer).await.expect("newer write");

    let result = repository.update(&created).await;

    assert!(matches!(result, Err(TaskRepositoryError::StaleWrite { .. })));
    let stored = repository
        .find_by_id(created.id())
        .await
        .expect("lookup")
        .expect("task should exist");
    assert_eq!(stored.updated_at(), newer.updated_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_by_id_of_unknown_task_is_none(repository: InMemoryTaskRepository) {
    let missing = TaskId::new(9).expect("valid task id");
    assert_eq!(repository.find_by_id(missing).await.expect("lookup"), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_all_is_ordered_by_id(repository: InMemoryTaskRepository) {
    assert!(repository.find_all().await.expect("list").is_empty());
    for title in ["one", "two", "three"] {
        repository.create(&unsaved(title)).await.expect("create");
    }

    let ids: Vec<i64> = repository
        .find_all()
        .await
        .expect("list")
        .iter()
        .map(|task| task.id().value())
        .collect();

    assert_eq!(ids, [1, 2, 3]);
}
