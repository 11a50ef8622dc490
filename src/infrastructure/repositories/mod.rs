pub mod json_storage;
pub mod memory_schedule_repository;
pub mod memory_task_repository;
pub mod reconcile;

pub use memory_schedule_repository::MemoryScheduleRepository;
pub use memory_task_repository::MemoryTaskRepository;
pub use reconcile::any_tasks_modified;
