//! View controller for the clinical trials explorer.
//!
//! [`Dashboard`] owns an explicit [`AppState`] and drives every user
//! operation: searching and paging, opening a study, the statistics panel,
//! the success-rate comparison and the precedent library. Panels are built
//! as plain data in [`view`], [`statistics`] and [`analysis`], so any front
//! end can render them.

pub mod analysis;
pub mod controller;
pub mod error;
pub mod log;
pub mod notify;
pub mod precedents;
pub mod state;
pub mod statistics;
pub mod view;

pub use analysis::SuccessRateView;
pub use controller::Dashboard;
pub use error::{DashboardError, Result};
pub use log::{ActivityLog, LogEntry, MAX_LOG_ENTRIES};
pub use notify::Notifier;
pub use precedents::{PrecedentFilter, PrecedentLibrary};
pub use state::{AppState, PageCursor, View};
pub use statistics::{DistributionView, EnrollmentBucket, EnrollmentView, Slice, StatisticsView};
pub use view::{
    DetailField, PaginationDisplay, ResultRow, ResultsView, StudyDetailView, format_count,
};
