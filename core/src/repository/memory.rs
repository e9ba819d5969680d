use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use crate::model::task::Task;
use crate::repository::traits::TaskRepository;

/// Keeps the "persisted" list in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    saved: Mutex<Vec<Task>>,
    fail_writes: Mutex<bool>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            saved: Mutex::new(tasks),
            fail_writes: Mutex::new(false),
        }
    }

    /// What the last successful save wrote.
    pub fn saved(&self) -> Vec<Task> {
        self.saved.lock().clone()
    }

    /// Makes every following save fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn load(&self) -> Result<Vec<Task>> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(anyhow!("disk full"));
        }
        *self.saved.lock() = tasks.to_vec();
        Ok(())
    }
}
