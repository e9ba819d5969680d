use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// On-disk shape of a task.
///
/// Times are the wall-clock reading counted as epoch seconds without any zone
/// offset, so every reading survives a reload whatever the local DST rules.
/// A missing value or `0` means unset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            description: task.description.clone(),
            begin: task.begin.map(to_epoch),
            end: task.end.map(to_epoch),
            done: task.done,
            tags: task.tags().map(str::to_string).collect(),
        }
    }
}

impl TaskRecord {
    /// Rebuilds the task. Tags beyond the cap are dropped with a warning.
    pub fn into_task(self) -> Task {
        let mut task = Task::new(self.description);
        task.begin = self.begin.and_then(from_epoch);
        task.end = self.end.and_then(from_epoch);
        task.done = self.done;
        for tag in self.tags {
            if task.add_tag(tag.clone()).is_err() {
                log::warn!("event=load_task status=tag_dropped tag={tag}");
            }
        }
        task
    }
}

fn to_epoch(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp()
}

fn from_epoch(secs: i64) -> Option<NaiveDateTime> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0).map(|utc| utc.naive_utc())
}
