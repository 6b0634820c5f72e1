//! Upload submitter and the pieces it validates with.

pub mod file;
pub mod submitter;
pub mod temp_id;
pub mod validation;

pub use file::UploadFile;
pub use submitter::{SubmitOutcome, UploadSubmitter};
pub use validation::has_allowed_extension;
