//! In-memory task repository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{PersistedTaskData, Task, TaskId, UnsavedTask},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Identifiers are assigned from a monotonically increasing sequence
/// starting at 1.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i64,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn storage_failure(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &UnsavedTask) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(storage_failure)?;
        let next = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| storage_failure("task identifier sequence exhausted"))?;
        let id = TaskId::new(next).map_err(TaskRepositoryError::persistence)?;
        let created = task.clone().into_task(id);
        state.last_id = next;
        state.tasks.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(storage_failure)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        if task.updated_at() < stored.updated_at() {
            return Err(TaskRepositoryError::StaleWrite {
                task_id: task.id(),
                stored: stored.updated_at(),
                attempted: task.updated_at(),
            });
        }

        // Creation time is immutable once assigned.
        *stored = Task::from_persisted(PersistedTaskData {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            created_at: stored.created_at(),
            updated_at: task.updated_at(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(storage_failure)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(storage_failure)?;
        Ok(state.tasks.values().cloned().collect())
    }
}
