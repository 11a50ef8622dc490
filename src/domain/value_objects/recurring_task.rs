use serde::{Deserialize, Serialize};

/// Template for a task that recurs on a schedule.
///
/// A pure value object: two recurring tasks with the same name and
/// description are indistinguishable, and there is no persistent identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTask {
    name: String,
    description: String,
}

impl RecurringTask {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
