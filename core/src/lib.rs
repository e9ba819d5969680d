pub mod config;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::Config;
pub use error::{ParseError, StoreError};
pub use interpreter::{Action, Interpreter, ShowFilter};
pub use model::task::{Task, MAXIMUM_TAGS};
pub use repository::{FileTaskRepository, MemoryTaskRepository, TaskRepository};
pub use service::dto::TaskDto;
pub use service::task_store::{SnapshotListener, TaskStore};
pub use usecase::command::Command;
pub use usecase::controller::{InputStatus, Outcome, Reminder, Tasuke, UiEvent};
