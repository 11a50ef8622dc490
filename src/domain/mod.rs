pub mod clock;
pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::schedule::{Schedule, ScheduleError};
pub use entities::task::Task;
pub use value_objects::frequency::{Frequency, FrequencyError};
pub use value_objects::recurring_task::RecurringTask;
pub use value_objects::time_period::TimePeriod;
