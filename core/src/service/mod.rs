pub mod dto;
pub mod task_store;
