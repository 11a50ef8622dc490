pub mod scheduler_tokio;

pub use scheduler_tokio::{DEFAULT_WAIT, RUN_OFFSET, start};
