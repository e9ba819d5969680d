use crate::error::StoreError;
use crate::model::task::Task;
use crate::repository::TaskRepository;
use crate::service::task_store::{TaskList, TaskStore};

/// A task captured at the position it had when the command was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub position: usize,
    pub task: Task,
}

/// One edited task: its value before and after the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub position: usize,
    pub before: Task,
    pub after: Task,
}

/// A reversible operation on the store.
///
/// Each variant carries everything its `undo` needs. `run` and `undo` are a
/// single store transaction each, so a command is persisted once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { task: Task },
    /// Targets in ascending position order.
    Remove { targets: Vec<Target> },
    Edit { targets: Vec<EditTarget> },
    Done { targets: Vec<Target>, done: bool },
    Clear { tasks: Vec<Task> },
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Edit { .. } => "edit",
            Command::Done { done: true, .. } => "done",
            Command::Done { done: false, .. } => "undone",
            Command::Clear { .. } => "clear",
        }
    }

    /// User-facing confirmation for a successful run.
    pub fn summary(&self) -> String {
        match self {
            Command::Add { task } => format!("Added \"{}\".", task.description),
            Command::Remove { targets } => match targets.as_slice() {
                [one] => format!("Removed \"{}\".", one.task.description),
                many => format!("Removed {} tasks.", many.len()),
            },
            Command::Edit { targets } => match targets.as_slice() {
                [one] => format!("Edited task {}.", one.position + 1),
                many => format!("Edited {} tasks.", many.len()),
            },
            Command::Done { targets, done } => {
                let state = if *done { "done" } else { "not done" };
                match targets.as_slice() {
                    [one] => format!("Marked \"{}\" as {state}.", one.task.description),
                    many => format!("Marked {} tasks as {state}.", many.len()),
                }
            }
            Command::Clear { tasks } => format!("Cleared {} tasks.", tasks.len()),
        }
    }

    pub fn run<R: TaskRepository>(&self, store: &TaskStore<R>) -> Result<(), StoreError> {
        store.transaction(|list| self.apply(list))
    }

    pub fn undo<R: TaskRepository>(&self, store: &TaskStore<R>) -> Result<(), StoreError> {
        store.transaction(|list| self.revert(list))
    }

    fn apply(&self, list: &mut TaskList) -> Result<(), StoreError> {
        match self {
            Command::Add { task } => list.push(task.clone()),
            Command::Remove { targets } => {
                for target in targets.iter().rev() {
                    let pos = list.locate(&target.task, Some(target.position))?;
                    list.remove(pos)?;
                }
            }
            Command::Edit { targets } => {
                for target in targets {
                    let pos = list.locate(&target.before, Some(target.position))?;
                    list.replace(pos, target.after.clone())?;
                }
            }
            Command::Done { targets, done } => {
                for target in targets.iter().rev() {
                    let pos = list.locate(&target.task, Some(target.position))?;
                    let mut marked = target.task.clone();
                    marked.done = *done;
                    list.replace(pos, marked)?;
                }
            }
            Command::Clear { .. } => {
                list.clear();
            }
        }
        Ok(())
    }

    fn revert(&self, list: &mut TaskList) -> Result<(), StoreError> {
        match self {
            Command::Add { task } => {
                let pos = list.locate(task, None)?;
                list.withdraw(pos)?;
            }
            Command::Remove { targets } => {
                for target in targets {
                    list.insert(target.position, target.task.clone());
                }
            }
            Command::Edit { targets } => {
                for target in targets.iter().rev() {
                    let pos = list.locate(&target.after, None)?;
                    list.replace(pos, target.before.clone())?;
                }
            }
            Command::Done { targets, done } => {
                for target in targets {
                    let mut marked = target.task.clone();
                    marked.done = *done;
                    let pos = list.locate(&marked, None)?;
                    list.replace(pos, target.task.clone())?;
                }
            }
            Command::Clear { tasks } => list.restore(tasks.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryTaskRepository;

    fn store_with(descriptions: &[&str]) -> TaskStore<MemoryTaskRepository> {
        let tasks = descriptions.iter().map(|d| Task::new(*d)).collect();
        TaskStore::open(MemoryTaskRepository::with_tasks(tasks)).unwrap()
    }

    fn descriptions(store: &TaskStore<MemoryTaskRepository>) -> Vec<String> {
        store.get_tasks().into_iter().map(|t| t.description).collect()
    }

    fn target(store: &TaskStore<MemoryTaskRepository>, position: usize) -> Target {
        Target {
            position,
            task: store.get_task(position).unwrap(),
        }
    }

    #[test]
    fn test_add_and_undo() {
        let store = store_with(&["a"]);
        let cmd = Command::Add { task: Task::new("b") };
        cmd.run(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["a", "b"]);
        cmd.undo(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["a"]);
    }

    #[test]
    fn test_remove_and_undo_restore_positions() {
        let store = store_with(&["a", "b", "c", "d"]);
        let cmd = Command::Remove {
            targets: vec![target(&store, 1), target(&store, 3)],
        };
        cmd.run(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["a", "c"]);
        cmd.undo(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_edit_and_undo() {
        let store = store_with(&["a", "b"]);
        let before = store.get_task(0).unwrap();
        let mut after = before.clone();
        after.description = "z".to_string();
        let cmd = Command::Edit {
            targets: vec![EditTarget {
                position: 0,
                before,
                after,
            }],
        };
        cmd.run(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["b", "z"]);
        cmd.undo(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_done_undo_restores_prior_flag() {
        let mut finished = Task::new("finished");
        finished.done = true;
        let store = TaskStore::open(MemoryTaskRepository::with_tasks(vec![Task::new("open"), finished])).unwrap();
        let cmd = Command::Done {
            targets: vec![target(&store, 0), target(&store, 1)],
            done: true,
        };
        cmd.run(&store).unwrap();
        assert!(store.get_tasks().iter().all(|t| t.done));

        cmd.undo(&store).unwrap();
        let open = store.search_by_description("open", true);
        let finished = store.search_by_description("finished", true);
        assert!(!open[0].done);
        assert!(finished[0].done);
    }

    #[test]
    fn test_clear_and_undo() {
        let store = store_with(&["a", "b"]);
        let cmd = Command::Clear { tasks: store.get_tasks() };
        cmd.run(&store).unwrap();
        assert_eq!(store.total_tasks(), 0);
        cmd.undo(&store).unwrap();
        assert_eq!(descriptions(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_stale_target_is_an_error() {
        let store = store_with(&["a"]);
        let cmd = Command::Remove {
            targets: vec![Target {
                position: 0,
                task: Task::new("ghost"),
            }],
        };
        assert_eq!(cmd.run(&store), Err(StoreError::StaleIndex(0)));
        assert_eq!(descriptions(&store), vec!["a"]);
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(Command::Add { task: Task::new("milk") }.summary(), "Added \"milk\".");
        assert_eq!(Command::Clear { tasks: vec![] }.summary(), "Cleared 0 tasks.");
        let cmd = Command::Done {
            targets: vec![Target {
                position: 0,
                task: Task::new("milk"),
            }],
            done: false,
        };
        assert_eq!(cmd.kind(), "undone");
        assert_eq!(cmd.summary(), "Marked \"milk\" as not done.");
    }
}
