pub mod frequency;
pub mod recurring_task;
pub mod time_period;

pub use frequency::{Frequency, FrequencyError};
pub use recurring_task::RecurringTask;
pub use time_period::TimePeriod;
