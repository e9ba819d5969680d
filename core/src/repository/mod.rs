pub mod file;
pub mod memory;
pub mod record;
pub mod traits;

// Re-export
pub use file::FileTaskRepository;
pub use memory::MemoryTaskRepository;
pub use record::TaskRecord;
pub use traits::TaskRepository;
