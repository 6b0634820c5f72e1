//! Background status polling for assigned jobs.

pub mod scheduler;

pub use scheduler::{PollerHandle, StatusPoller, TickReport};
