use serde::{Deserialize, Serialize};
use std::fmt;

/// The calendar period a frequency's interval steps over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    Hour,
    Day,
    Week,
    Month,
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimePeriod::Hour => write!(f, "Hour"),
            TimePeriod::Day => write!(f, "Day"),
            TimePeriod::Week => write!(f, "Week"),
            TimePeriod::Month => write!(f, "Month"),
        }
    }
}
