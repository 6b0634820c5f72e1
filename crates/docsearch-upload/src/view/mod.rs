//! Presentation projection: rows, badges and the page notice.

pub mod notice;
pub mod rows;

pub use notice::{Notice, NoticeBoard};
pub use rows::{badge_label, status_icon, JobListView, JobRow, RenderDiff, CHECKING_INDICATOR};
