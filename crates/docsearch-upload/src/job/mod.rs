//! Upload jobs and the store that holds them.

pub mod model;
pub mod store;

pub use model::{Job, JobId, JobPatch, JobStatus};
pub use store::{JobSnapshot, JobStore};
