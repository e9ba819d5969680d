use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Read-only view of a task handed to the presentation layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskDto {
    /// 1-based position in the store at the time of the snapshot.
    pub id: usize,
    pub description: String,
    pub tags: Vec<String>,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub done: bool,

    // Flattened predicates for display
    pub is_floating: bool,
    pub is_event: bool,
    pub is_overdue: bool,
    pub is_ongoing: bool,
    pub is_due_today: bool,
    pub is_due_tomorrow: bool,
    pub time_difference: Option<String>,
}

impl TaskDto {
    /// `position` is 0-based; the DTO carries the 1-based id.
    pub fn from_entity(position: usize, task: &Task, now: NaiveDateTime) -> Self {
        Self {
            id: position + 1,
            description: task.description.clone(),
            tags: task.tags().map(str::to_string).collect(),
            begin: task.begin,
            end: task.end,
            done: task.done,
            is_floating: task.is_floating(),
            is_event: task.is_event(),
            is_overdue: task.is_overdue_at(now),
            is_ongoing: task.is_ongoing_at(now),
            is_due_today: task.is_due_today_at(now),
            is_due_tomorrow: task.is_due_tomorrow_at(now),
            time_difference: task.time_difference(now),
        }
    }
}

/// Snapshot of a whole list, numbered from 1.
pub fn snapshot(tasks: &[Task], now: NaiveDateTime) -> Vec<TaskDto> {
    tasks
        .iter()
        .enumerate()
        .map(|(position, task)| TaskDto::from_entity(position, task, now))
        .collect()
}

/// Snapshot of a filtered view; each task keeps its store position.
pub fn snapshot_of(entries: &[(usize, Task)], now: NaiveDateTime) -> Vec<TaskDto> {
    entries
        .iter()
        .map(|(position, task)| TaskDto::from_entity(*position, task, now))
        .collect()
}
