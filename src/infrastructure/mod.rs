pub mod repositories;
pub mod scheduler;
