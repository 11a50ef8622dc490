//! Recurring task scheduling core.
//!
//! Declarative [`Frequency`](domain::Frequency) rules describe when a
//! [`Schedule`](domain::Schedule) fires; a background worker
//! ([`infrastructure::scheduler`]) materializes due occurrences as
//! [`Task`](domain::Task)s and sleeps until the next one. Transport, auth
//! and SQL persistence live outside this crate and talk to it through the
//! repository traits in [`domain::repositories`].

pub mod application;
pub mod domain;
pub mod infrastructure;
