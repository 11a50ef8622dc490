use serde::{Deserialize, Serialize};

use crate::domain::value_objects::recurring_task::RecurringTask;

/// A concrete work item materialized from a recurring task template at tick
/// time. Carries no back-reference to the schedule or the firing instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    name: String,
    description: String,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Copies a template's fields into a fresh task
    pub fn from_template(template: &RecurringTask) -> Self {
        Self::new(template.name(), template.description())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
