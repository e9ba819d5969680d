use crate::model::task::Task;
use anyhow::Result;

/// Durable home of the task list. The whole list is loaded and saved at once.
pub trait TaskRepository {
    fn load(&self) -> Result<Vec<Task>>;
    fn save(&self, tasks: &[Task]) -> Result<()>;
}
