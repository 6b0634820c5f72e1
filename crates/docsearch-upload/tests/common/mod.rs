//! Shared test utilities for tracker integration tests.
//!
//! - `FakeApi`: scripted in-memory `JobApi` that records every call
//! - builders for files, status payloads and configs

pub mod builders;
pub mod fake_api;

pub use builders::*;
pub use fake_api::FakeApi;
