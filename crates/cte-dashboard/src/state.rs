//! Application state owned by the dashboard controller.

use std::collections::HashMap;

use cte_client::SearchQuery;
use cte_model::{NctId, Study};

use crate::analysis::SuccessRateView;
use crate::log::ActivityLog;
use crate::statistics::StatisticsView;
use crate::view::{ResultsView, StudyDetailView};

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Search,
    StudyDetail,
    Statistics,
    Analysis,
    Precedents,
}

/// Paging cursor of the current search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub current_page: u64,
    pub total_results: u64,
    pub total_pages: u64,
    /// Token for the page after `current_page`.
    pub next_page_token: Option<String>,
    pub has_next_page: bool,
}

/// Root of all dashboard state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current tab
    pub view: View,
    /// Last submitted search form
    pub query: SearchQuery,
    pub cursor: PageCursor,
    /// Results panel (None before the first search)
    pub results: Option<ResultsView>,
    /// Detail panel (None until a study is opened)
    pub detail: Option<StudyDetailView>,
    pub statistics: Option<StatisticsView>,
    pub success_rate: Option<SuccessRateView>,
    /// Studies fetched so far, by NCT ID
    pub study_cache: HashMap<NctId, Study>,
    pub log: ActivityLog,
}
