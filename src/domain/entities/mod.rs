pub mod schedule;
pub mod task;

pub use schedule::{Schedule, ScheduleError};
pub use task::Task;
