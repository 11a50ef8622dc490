pub mod services;

pub use services::{ScheduleService, ServiceError, check_schedules};
