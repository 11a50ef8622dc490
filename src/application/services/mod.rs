pub mod schedule_service;
pub mod scheduler_service;

pub use schedule_service::{ScheduleService, ServiceError};
pub use scheduler_service::check_schedules;
