//! The top-level view controller.

use std::time::Duration;

use cte_client::{
    ApiError, FETCH_ALL_DELAY, FetchProgress, FieldType, SearchQuery, SearchType,
    SuccessRateQuery, TrialsApi, fetch_all,
};
use cte_model::{NctId, PrecedentCase};
use cte_outcomes::Heuristics;
use tracing::{debug, error, info, warn};

use crate::analysis::SuccessRateView;
use crate::error::{DashboardError, Result};
use crate::notify::Notifier;
use crate::precedents::{PrecedentFilter, PrecedentLibrary};
use crate::state::{AppState, PageCursor, View};
use crate::statistics::{
    StatisticsView, enrollment_distribution, phase_distribution, status_distribution,
};
use crate::view::{ResultsView, StudyDetailView, format_count};

const MISSING_TERM: &str = "Please enter a search term";
const MISSING_COMPARISON_INPUT: &str =
    "Please enter at least a condition or intervention to compare";

/// Requests made by `load_statistics`.
const STATISTICS_PARTS: usize = 5;

/// Owns the application state and runs every user operation against it.
///
/// Each operation either updates the state and appends one summary line to
/// the activity log, or alerts the user, logs `Error: {message}` and leaves
/// the displayed panels untouched. Nothing is retried.
pub struct Dashboard<A, N> {
    api: A,
    notifier: N,
    heuristics: Heuristics,
    precedents: PrecedentLibrary,
    fetch_delay: Duration,
    state: AppState,
}

impl<A: TrialsApi, N: Notifier> Dashboard<A, N> {
    pub fn new(api: A, notifier: N, heuristics: Heuristics) -> Self {
        Self {
            api,
            notifier,
            heuristics,
            precedents: PrecedentLibrary::default(),
            fetch_delay: FETCH_ALL_DELAY,
            state: AppState::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.state.query.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    #[must_use]
    pub fn with_precedents(mut self, precedents: PrecedentLibrary) -> Self {
        self.precedents = precedents;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    pub fn open(&mut self, view: View) {
        self.state.view = view;
    }

    /// Runs a new search from page one.
    ///
    /// An NCT ID search opens the study directly instead.
    pub fn search(&mut self, mut query: SearchQuery) -> Result<()> {
        if query.is_missing_term() {
            return Err(self.reject(MISSING_TERM));
        }
        if query.search_type == SearchType::NctId {
            let term = query.term.clone();
            self.view_study(&term)?;
            self.state.query = query;
            return Ok(());
        }
        if query.page_size == 0 {
            query.page_size = self.state.query.page_size.max(1);
        }
        query.page = 1;
        query.page_token = None;
        self.run_search(query)
    }

    /// Moves to the next page. Returns `false` when there is none.
    pub fn next_page(&mut self) -> Result<bool> {
        if self.state.results.is_none() || !self.state.cursor.has_next_page {
            return Ok(false);
        }
        let query = SearchQuery {
            page: self.state.cursor.current_page + 1,
            page_token: self.state.cursor.next_page_token.clone(),
            ..self.state.query.clone()
        };
        self.run_search(query)?;
        Ok(true)
    }

    /// Moves to the previous page. Returns `false` on the first page.
    pub fn prev_page(&mut self) -> Result<bool> {
        if self.state.results.is_none() || self.state.cursor.current_page <= 1 {
            return Ok(false);
        }
        let query = SearchQuery {
            page: self.state.cursor.current_page - 1,
            page_token: None,
            ..self.state.query.clone()
        };
        self.run_search(query)?;
        Ok(true)
    }

    /// Collects every matching study into one unpaged result list.
    pub fn search_all<F>(&mut self, query: SearchQuery, on_page: F) -> Result<usize>
    where
        F: FnMut(FetchProgress),
    {
        if query.is_missing_term() {
            return Err(self.reject(MISSING_TERM));
        }
        info!(search_type = %query.search_type, term = %query.term, "Fetching all studies");
        let studies = match fetch_all(&self.api, &query, self.fetch_delay, on_page) {
            Ok(studies) => studies,
            Err(err) => return Err(self.fail(err)),
        };

        let count = studies.len();
        self.state.query = query;
        self.state.cursor = PageCursor {
            current_page: 1,
            total_results: count as u64,
            total_pages: 1,
            next_page_token: None,
            has_next_page: false,
        };
        self.state.results = Some(ResultsView::from_studies(&studies));
        self.state.view = View::Search;
        self.state
            .log
            .push(format!("Fetched {} studies", format_count(count as u64)));
        Ok(count)
    }

    /// Opens a study, from the cache when it was fetched before.
    pub fn view_study(&mut self, nct_id: &str) -> Result<()> {
        let nct_id = match NctId::new(nct_id) {
            Ok(id) => id,
            Err(err) => return Err(self.fail(err.into())),
        };

        let study = match self.state.study_cache.get(&nct_id) {
            Some(study) => {
                debug!(%nct_id, "Study served from cache");
                study.clone()
            }
            None => match self.api.get_study(&nct_id) {
                Ok(study) => {
                    self.state.study_cache.insert(nct_id.clone(), study.clone());
                    study
                }
                Err(err) => return Err(self.fail(err)),
            },
        };

        let detail = StudyDetailView::build(&study, &self.heuristics);
        info!(
            %nct_id,
            outcomes = detail.outcome_visualizations.len(),
            "Loaded study details"
        );
        self.state.log.push(format!("Loaded study {nct_id}"));
        self.state.detail = Some(detail);
        self.state.view = View::StudyDetail;
        Ok(())
    }

    /// Loads the statistics panel.
    ///
    /// Each part loads independently. Failed parts are logged and left
    /// empty; the user is alerted only when nothing could be loaded.
    pub fn load_statistics(&mut self) -> Result<()> {
        let mut view = StatisticsView::default();
        let mut failures = Vec::new();

        match self.api.field_values("OverallStatus", FieldType::Enum) {
            Ok(stats) => {
                view.status = stats
                    .first()
                    .map(|s| status_distribution(s, &self.heuristics));
            }
            Err(err) => failures.push(err),
        }
        match self.api.field_values("Phase", FieldType::Enum) {
            Ok(stats) => {
                view.phase = stats
                    .first()
                    .map(|s| phase_distribution(s, &self.heuristics));
            }
            Err(err) => failures.push(err),
        }
        match self.api.field_values("EnrollmentCount", FieldType::Integer) {
            Ok(stats) => view.enrollment = stats.first().map(enrollment_distribution),
            Err(err) => failures.push(err),
        }
        match self.api.sizes() {
            Ok(sizes) => view.total_studies = Some(sizes.total_studies),
            Err(err) => failures.push(err),
        }
        let with_results = SearchQuery {
            has_results: Some(true),
            page_size: 1,
            count_total: true,
            ..SearchQuery::default()
        };
        match self.api.search_studies(&with_results) {
            Ok(page) => view.studies_with_results = Some(page.pagination.total_count),
            Err(err) => failures.push(err),
        }

        if failures.len() == STATISTICS_PARTS {
            let first = failures.swap_remove(0);
            return Err(self.fail(first));
        }
        for err in &failures {
            let message = err.user_message();
            warn!("Statistics part failed: {message}");
            self.state.log.push(message);
        }

        self.state.log.push(format!(
            "Statistics loaded ({} of {STATISTICS_PARTS} parts)",
            STATISTICS_PARTS - failures.len()
        ));
        self.state.statistics = Some(view);
        self.state.view = View::Statistics;
        Ok(())
    }

    /// Runs the success-rate comparison.
    pub fn success_rates(&mut self, query: SuccessRateQuery) -> Result<()> {
        if query.is_empty() {
            return Err(self.reject(MISSING_COMPARISON_INPUT));
        }
        let analysis = match self.api.success_rates(&query) {
            Ok(analysis) => analysis,
            Err(err) => return Err(self.fail(err)),
        };
        let view = SuccessRateView::build(&analysis);
        self.state
            .log
            .push(format!("Success rate: {}", view.success_rate));
        self.state.success_rate = Some(view);
        self.state.view = View::Analysis;
        Ok(())
    }

    /// Matching precedent cases, strongest first.
    pub fn precedents(&self, filter: &PrecedentFilter) -> Vec<&PrecedentCase> {
        self.precedents.search(filter)
    }

    /// Runs one page of `query`; the query becomes current only on success.
    fn run_search(&mut self, query: SearchQuery) -> Result<()> {
        info!(
            search_type = %query.search_type,
            term = %query.term,
            page = query.page,
            "Searching studies"
        );
        let page = match self.api.search_studies(&query) {
            Ok(page) => page,
            Err(err) => return Err(self.fail(err)),
        };

        let view = ResultsView::from_page(&page, query.page, query.page_size);
        if let Some(pagination) = &view.pagination {
            self.state.cursor = PageCursor {
                current_page: pagination.current_page,
                total_results: pagination.total,
                total_pages: pagination.total_pages,
                next_page_token: page.next_page_token().map(str::to_string),
                has_next_page: pagination.next_enabled,
            };
        }
        let summary = view
            .stats_text
            .clone()
            .unwrap_or_else(|| "No studies found".to_string());
        self.state.log.push(summary);
        self.state.results = Some(view);
        self.state.view = View::Search;
        self.state.query = query;
        Ok(())
    }

    /// Alerts, logs and wraps a failed API call.
    fn fail(&mut self, err: ApiError) -> DashboardError {
        let message = err.user_message();
        error!("{message}");
        self.notifier.alert(&message);
        self.state.log.push(message);
        DashboardError::Api(err)
    }

    fn reject(&mut self, message: &'static str) -> DashboardError {
        warn!("{message}");
        self.notifier.alert(message);
        DashboardError::MissingInput(message)
    }
}
