use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::task::MAXIMUM_TAGS;

/// Everything that can go wrong while turning a line of user text into an action.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("I don't know what to do for '{0}'.")]
    BadCommand(String),
    #[error("A task can't have more than {} tags.", MAXIMUM_TAGS)]
    TooManyTags,
    #[error("You can't have more than 2 time periods or deadlines in a task.")]
    MultipleDates,
    #[error("Start time ({}) is after end time ({}).", .0.format("%d/%m/%Y %H:%M"), .1.format("%d/%m/%Y %H:%M"))]
    InvalidPeriod(NaiveDateTime, NaiveDateTime),
    #[error("'{0}' doesn't look like a valid range.")]
    NotARange(String),
    #[error("Start number ({0}) is after end number ({1}).")]
    InvalidRange(usize, usize),
    #[error("'{0}' doesn't look like a number.")]
    NotANumber(String),
    #[error("There is no task '{0}'. Please give a number between 1 and {1}.")]
    IdOutOfRange(usize, usize),
    #[error("You need to tell me what to add.")]
    AddEmpty,
    #[error("You need to tell me what you want to change for the task.")]
    EditEmpty,
    #[error("You need to tell me which task(s) to remove.")]
    RemoveNoId,
    #[error("You need to tell me which task to edit.")]
    EditNoId,
    #[error("You need to tell me what to mark as done.")]
    DoneNoId,
    #[error("You need to tell me what to mark as undone.")]
    UndoneNoId,
    #[error("'{0}' can only be used when editing a task.")]
    EditOnly(String),
    #[error("Please give a name for your tag.")]
    TagNoName,
    #[error("Please give me a valid deadline for this task.")]
    NoDate,
    #[error("'{0}' doesn't look like a date or time I understand.")]
    InvalidDate(String),
    #[error("There is no last task.")]
    NoLast,
    #[error("There are no tasks.")]
    NoTasks,
}

/// Failures of the task store and its persistence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Could not save tasks: {0}")]
    StorageWriteFailed(String),
    #[error("Could not load tasks: {0}")]
    StorageReadFailed(String),
    #[error("Task list changed underneath a command (position {0}).")]
    StaleIndex(usize),
    #[error("There are no upcoming tasks.")]
    NoMoreTasks,
}
