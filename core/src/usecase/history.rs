use crate::error::StoreError;
use crate::repository::TaskRepository;
use crate::service::task_store::TaskStore;
use crate::usecase::command::Command;

/// What an undo or redo request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replay {
    Applied(Command),
    Nothing,
}

/// Undo and redo stacks over one timeline of commands.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a new command. On success it becomes undoable and the redo stack
    /// is dropped; on failure nothing changes.
    pub fn execute<R: TaskRepository>(&mut self, command: Command, store: &TaskStore<R>) -> Result<(), StoreError> {
        command.run(store)?;
        log::debug!("event=history_push kind={} depth={}", command.kind(), self.undo_stack.len() + 1);
        self.undo_stack.push(command);
        self.redo_stack.clear();
        Ok(())
    }

    pub fn undo<R: TaskRepository>(&mut self, store: &TaskStore<R>) -> Result<Replay, StoreError> {
        let Some(command) = self.undo_stack.pop() else {
            return Ok(Replay::Nothing);
        };
        if let Err(e) = command.undo(store) {
            self.undo_stack.push(command);
            return Err(e);
        }
        log::debug!("event=history_undo kind={}", command.kind());
        self.redo_stack.push(command.clone());
        Ok(Replay::Applied(command))
    }

    pub fn redo<R: TaskRepository>(&mut self, store: &TaskStore<R>) -> Result<Replay, StoreError> {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(Replay::Nothing);
        };
        if let Err(e) = command.run(store) {
            self.redo_stack.push(command);
            return Err(e);
        }
        log::debug!("event=history_redo kind={}", command.kind());
        self.undo_stack.push(command.clone());
        Ok(Replay::Applied(command))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
