pub mod api;
pub mod config;
pub mod error;
pub mod job;
pub mod poller;
pub mod sanitize;
pub mod tracker;
pub mod upload;
pub mod view;

pub use api::{ApiError, HttpJobApi, JobApi};
pub use config::{load_config, load_or_default, ClientConfig};
pub use error::{ConfigError, Result, SubmitError, UploadError};
pub use job::{Job, JobId, JobPatch, JobSnapshot, JobStatus, JobStore};
pub use poller::{PollerHandle, StatusPoller, TickReport};
pub use tracker::UploadTracker;
pub use upload::{SubmitOutcome, UploadFile, UploadSubmitter};
pub use view::{JobListView, JobRow, NoticeBoard, RenderDiff};
