//! The canonical task list.
//!
//! Every mutation runs as a transaction: it is applied to a copy of the list,
//! the copy is re-sorted and persisted, and only a successful write replaces
//! the in-memory list. Memory and disk therefore never disagree after a failed
//! save. After each committed mutation a snapshot is pushed to the listener.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::model::task::Task;
use crate::repository::TaskRepository;
use crate::service::dto::{snapshot, TaskDto};

/// Receives a fresh snapshot after every committed mutation.
pub trait SnapshotListener: Send + Sync {
    fn on_snapshot(&self, tasks: &[TaskDto]);
}

/// The list as seen inside a transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
    /// Tasks added this session, most recent last.
    added: Vec<Task>,
}

impl TaskList {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Task> {
        self.tasks.get(pos)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Appends a task and remembers it as the most recently added one.
    pub fn push(&mut self, task: Task) {
        self.added.push(task.clone());
        self.tasks.push(task);
    }

    /// Takes back an add: removes the task at `pos` and lets the previously
    /// added task become the last one again.
    pub fn withdraw(&mut self, pos: usize) -> Result<Task, StoreError> {
        let task = self.remove(pos)?;
        if let Some(i) = self.added.iter().rposition(|added| *added == task) {
            self.added.remove(i);
        }
        Ok(task)
    }

    /// Inserts at `pos`, or at the end when `pos` is past it.
    pub fn insert(&mut self, pos: usize, task: Task) {
        let pos = pos.min(self.tasks.len());
        self.tasks.insert(pos, task);
    }

    pub fn remove(&mut self, pos: usize) -> Result<Task, StoreError> {
        if pos >= self.tasks.len() {
            return Err(StoreError::StaleIndex(pos));
        }
        Ok(self.tasks.remove(pos))
    }

    pub fn pop(&mut self) -> Result<Task, StoreError> {
        self.tasks.pop().ok_or(StoreError::NoMoreTasks)
    }

    /// Overwrites the task at `pos` and returns the old value.
    pub fn replace(&mut self, pos: usize, task: Task) -> Result<Task, StoreError> {
        let slot = self.tasks.get_mut(pos).ok_or(StoreError::StaleIndex(pos))?;
        let old = std::mem::replace(slot, task.clone());
        for added in self.added.iter_mut().filter(|added| **added == old) {
            *added = task.clone();
        }
        Ok(old)
    }

    /// Finds `expected`, trying the `hint` position first and otherwise the
    /// last equal task in the list.
    pub fn locate(&self, expected: &Task, hint: Option<usize>) -> Result<usize, StoreError> {
        if let Some(pos) = hint {
            if self.tasks.get(pos) == Some(expected) {
                return Ok(pos);
            }
        }
        self.tasks
            .iter()
            .rposition(|task| task == expected)
            .ok_or_else(|| {
                let pos = hint.unwrap_or(self.tasks.len());
                log::error!("event=locate_task status=stale position={pos}");
                StoreError::StaleIndex(pos)
            })
    }

    pub fn clear(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    /// Replaces the whole list, keeping the given order.
    pub fn restore(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn last_added_position(&self) -> Option<usize> {
        let last = self.added.last()?;
        self.tasks.iter().rposition(|task| task == last)
    }

    /// The order used on disk. Three stable passes, so done-status ends up the
    /// most significant key and description the least.
    fn sort_for_save(&mut self) {
        sort_by_description(&mut self.tasks);
        sort_by_end_date(&mut self.tasks);
        sort_by_done(&mut self.tasks);
    }
}

pub struct TaskStore<R: TaskRepository> {
    repo: R,
    list: Mutex<TaskList>,
    listener: Option<Arc<dyn SnapshotListener>>,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Loads the persisted list.
    pub fn open(repo: R) -> Result<Self, StoreError> {
        let tasks = repo.load().map_err(|e| {
            log::error!("event=load_tasks status=failed");
            StoreError::StorageReadFailed(format!("{e:#}"))
        })?;
        log::info!("event=load_tasks status=ok count={}", tasks.len());
        Ok(Self {
            repo,
            list: Mutex::new(TaskList {
                tasks,
                added: Vec::new(),
            }),
            listener: None,
        })
    }

    pub fn with_listener(mut self, listener: Arc<dyn SnapshotListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Runs `f` against a copy of the list and commits it only if `f`
    /// succeeds and the result is saved.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut TaskList) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let (out, tasks) = {
            let mut guard = self.list.lock();
            let mut next = guard.clone();
            let out = f(&mut next)?;
            next.sort_for_save();
            self.repo.save(&next.tasks).map_err(|e| {
                log::error!("event=save_tasks status=failed count={}", next.tasks.len());
                StoreError::StorageWriteFailed(format!("{e:#}"))
            })?;
            log::debug!("event=save_tasks status=ok count={}", next.tasks.len());
            *guard = next;
            (out, guard.tasks.clone())
        };
        self.publish(&tasks);
        Ok(out)
    }

    pub fn add_task(&self, task: Task) -> Result<(), StoreError> {
        self.transaction(|list| {
            list.push(task);
            Ok(())
        })
    }

    pub fn insert_task(&self, task: Task, pos: usize) -> Result<(), StoreError> {
        self.transaction(|list| {
            list.insert(pos, task);
            Ok(())
        })
    }

    pub fn remove_task(&self, pos: usize) -> Result<Task, StoreError> {
        self.transaction(|list| list.remove(pos))
    }

    pub fn pop_task(&self) -> Result<Task, StoreError> {
        self.transaction(|list| list.pop())
    }

    pub fn replace_task(&self, pos: usize, task: Task) -> Result<Task, StoreError> {
        self.transaction(|list| list.replace(pos, task))
    }

    pub fn clear_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.transaction(|list| Ok(list.clear()))
    }

    pub fn get_task(&self, pos: usize) -> Option<Task> {
        self.list.lock().get(pos).cloned()
    }

    pub fn get_tasks(&self) -> Vec<Task> {
        self.list.lock().tasks.clone()
    }

    pub fn total_tasks(&self) -> usize {
        self.list.lock().len()
    }

    pub fn last_added_position(&self) -> Option<usize> {
        self.list.lock().last_added_position()
    }

    /// Tasks matching `predicate`, with their 0-based positions.
    pub fn find(&self, predicate: impl Fn(&Task) -> bool) -> Vec<(usize, Task)> {
        self.list
            .lock()
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| predicate(task))
            .map(|(pos, task)| (pos, task.clone()))
            .collect()
    }

    /// Substring match on descriptions, in store order.
    pub fn search_by_description(&self, keyword: &str, case_sensitive: bool) -> Vec<Task> {
        let matcher = Matcher::new(keyword, case_sensitive);
        self.find(|task| matcher.contained_in(&task.description))
            .into_iter()
            .map(|(_, task)| task)
            .collect()
    }

    /// Exact tag match, in store order.
    pub fn search_by_tag(&self, tag: &str, case_sensitive: bool) -> Vec<Task> {
        let matcher = Matcher::new(tag, case_sensitive);
        self.find(|task| task.tags().any(|t| matcher.equals(t)))
            .into_iter()
            .map(|(_, task)| task)
            .collect()
    }

    pub fn sort_by_description(&self) {
        self.reorder(sort_by_description);
    }

    pub fn sort_by_end_date(&self) {
        self.reorder(sort_by_end_date);
    }

    pub fn sort_by_begin_date(&self) {
        self.reorder(sort_by_begin_date);
    }

    pub fn sort_by_done(&self) {
        self.reorder(sort_by_done);
    }

    /// The not-done task that begins soonest after `now`.
    pub fn next_upcoming_task(&self, now: NaiveDateTime) -> Result<Task, StoreError> {
        self.list
            .lock()
            .tasks
            .iter()
            .filter(|task| !task.done)
            .filter_map(|task| task.begin.filter(|begin| *begin > now).map(|begin| (begin, task)))
            .min_by_key(|(begin, _)| *begin)
            .map(|(_, task)| task.clone())
            .ok_or(StoreError::NoMoreTasks)
    }

    pub fn snapshot(&self, now: NaiveDateTime) -> Vec<TaskDto> {
        snapshot(&self.list.lock().tasks, now)
    }

    // Sorting only changes the in-memory view; the next save re-sorts anyway.
    fn reorder(&self, sort: fn(&mut Vec<Task>)) {
        let tasks = {
            let mut guard = self.list.lock();
            sort(&mut guard.tasks);
            guard.tasks.clone()
        };
        self.publish(&tasks);
    }

    fn publish(&self, tasks: &[Task]) {
        if let Some(listener) = &self.listener {
            listener.on_snapshot(&snapshot(tasks, Local::now().naive_local()));
        }
    }
}

struct Matcher {
    needle: String,
    case_sensitive: bool,
}

impl Matcher {
    fn new(needle: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            needle.to_string()
        } else {
            needle.to_lowercase()
        };
        Self {
            needle,
            case_sensitive,
        }
    }

    fn contained_in(&self, haystack: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(&self.needle)
        } else {
            haystack.to_lowercase().contains(&self.needle)
        }
    }

    fn equals(&self, other: &str) -> bool {
        if self.case_sensitive {
            other == self.needle
        } else {
            other.to_lowercase() == self.needle
        }
    }
}

fn sort_by_description(tasks: &mut Vec<Task>) {
    tasks.sort_by(|a, b| a.description.to_lowercase().cmp(&b.description.to_lowercase()));
}

// Dated tasks first, earliest first; undated ones keep their order at the end.
fn sort_by_end_date(tasks: &mut Vec<Task>) {
    tasks.sort_by_key(|task| (task.end.is_none(), task.end));
}

fn sort_by_begin_date(tasks: &mut Vec<Task>) {
    tasks.sort_by_key(|task| (task.begin.is_none(), task.begin));
}

fn sort_by_done(tasks: &mut Vec<Task>) {
    tasks.sort_by_key(|task| task.done);
}
