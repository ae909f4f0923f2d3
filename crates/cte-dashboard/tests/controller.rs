use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use cte_client::{
    ApiError, FieldType, Result, SearchPage, SearchQuery, SearchType, SuccessRateQuery, TrialsApi,
    decode_envelope,
};
use cte_dashboard::{Dashboard, DashboardError, View};
use cte_model::{
    FieldValueStats, NctId, SearchData, SizeStats, Study, StudyResponse, SuccessRateAnalysis,
};
use cte_outcomes::Heuristics;

/// Replays queued responses and records what was asked for.
#[derive(Default)]
struct FakeApi {
    searches: RefCell<VecDeque<Result<SearchPage>>>,
    studies: RefCell<VecDeque<Result<Study>>>,
    field_values: RefCell<VecDeque<Result<Vec<FieldValueStats>>>>,
    sizes: RefCell<Option<Result<SizeStats>>>,
    search_calls: RefCell<Vec<SearchQuery>>,
    study_calls: RefCell<Vec<String>>,
}

fn http_error() -> ApiError {
    ApiError::Http {
        status: 503,
        body: String::new(),
    }
}

impl TrialsApi for FakeApi {
    fn search_studies(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.search_calls.borrow_mut().push(query.clone());
        self.searches
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(http_error()))
    }

    fn get_study(&self, nct_id: &NctId) -> Result<Study> {
        self.study_calls.borrow_mut().push(nct_id.to_string());
        self.studies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(http_error()))
    }

    fn field_values(&self, _field: &str, _field_type: FieldType) -> Result<Vec<FieldValueStats>> {
        self.field_values
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(http_error()))
    }

    fn sizes(&self) -> Result<SizeStats> {
        self.sizes.borrow_mut().take().unwrap_or_else(|| Err(http_error()))
    }

    fn success_rates(&self, _query: &SuccessRateQuery) -> Result<SuccessRateAnalysis> {
        Err(ApiError::unsuccessful("API request was not successful"))
    }
}

fn study(nct_id: &str, title: &str) -> Study {
    serde_json::from_value(serde_json::json!({
        "protocolSection": {
            "identificationModule": {"nctId": nct_id, "briefTitle": title},
            "statusModule": {"overallStatus": "COMPLETED"},
            "designModule": {"phases": ["PHASE3"]}
        },
        "hasResults": true
    }))
    .unwrap()
}

fn search_page(json: serde_json::Value) -> SearchPage {
    let envelope = decode_envelope::<SearchData>(200, &json.to_string()).unwrap();
    SearchPage {
        studies: envelope.data.unwrap_or_default().studies,
        pagination: envelope.pagination.unwrap_or_default(),
    }
}

fn page_of(count: usize, current_page: u64, next_token: Option<&str>) -> SearchPage {
    let studies: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "protocolSection": {"identificationModule": {
                    "nctId": format!("NCT{:08}", i),
                    "briefTitle": format!("Study {i}")
                }}
            })
        })
        .collect();
    search_page(serde_json::json!({
        "success": true,
        "data": {"studies": studies},
        "pagination": {
            "totalCount": 450,
            "totalPages": 23,
            "currentPage": current_page,
            "hasNextPage": next_token.is_some(),
            "nextPageToken": next_token
        }
    }))
}

fn dashboard(api: FakeApi) -> Dashboard<FakeApi, Vec<String>> {
    Dashboard::new(api, Vec::new(), Heuristics::default())
        .with_page_size(20)
        .with_fetch_delay(Duration::ZERO)
}

#[test]
fn search_renders_rows_and_pagination() {
    let api = FakeApi::default();
    api.searches.borrow_mut().push_back(Ok(page_of(20, 1, Some("tok2"))));
    let mut dashboard = dashboard(api);

    dashboard
        .search(SearchQuery::new(SearchType::Condition, "diabetes"))
        .unwrap();

    let params = dashboard.api().search_calls.borrow()[0].to_params();
    assert!(params.contains(&("condition", "diabetes".to_string())));
    assert!(params.contains(&("pageSize", "20".to_string())));
    assert!(params.contains(&("page", "1".to_string())));

    let results = dashboard.state().results.as_ref().unwrap();
    assert_eq!(results.rows.len(), 20);
    assert_eq!(results.stats_text.as_deref(), Some("Found 450 studies"));
    let pagination = results.pagination.unwrap();
    assert_eq!(pagination.range_text(), "1–20 of 450");
    assert!(!pagination.prev_enabled);
    assert!(pagination.next_enabled);
    assert_eq!(dashboard.state().log.last().unwrap().message, "Found 450 studies");
    assert!(dashboard.notifier().is_empty());
}

#[test]
fn paging_follows_and_resets_tokens() {
    let api = FakeApi::default();
    api.searches.borrow_mut().extend([
        Ok(page_of(20, 1, Some("tok2"))),
        Ok(page_of(20, 2, Some("tok3"))),
        Ok(page_of(20, 1, Some("tok2"))),
    ]);
    let mut dashboard = dashboard(api);
    dashboard
        .search(SearchQuery::new(SearchType::Condition, "diabetes"))
        .unwrap();

    assert!(!dashboard.prev_page().unwrap());
    assert!(dashboard.next_page().unwrap());
    let range = dashboard.state().results.as_ref().unwrap().pagination.unwrap();
    assert_eq!(range.range_text(), "21–40 of 450");
    assert!(dashboard.prev_page().unwrap());

    let calls = dashboard.api().search_calls.borrow();
    let tokens: Vec<_> = calls.iter().map(|q| (q.page, q.page_token.clone())).collect();
    assert_eq!(
        tokens,
        vec![(1, None), (2, Some("tok2".to_string())), (1, None)]
    );
}

#[test]
fn empty_typed_search_alerts_without_request() {
    let mut dashboard = dashboard(FakeApi::default());

    let err = dashboard
        .search(SearchQuery::new(SearchType::Sponsor, "  "))
        .unwrap_err();

    assert!(matches!(err, DashboardError::MissingInput(_)));
    assert_eq!(*dashboard.notifier(), vec!["Please enter a search term"]);
    assert!(dashboard.api().search_calls.borrow().is_empty());
}

#[test]
fn failed_search_keeps_previous_results() {
    let api = FakeApi::default();
    api.searches.borrow_mut().push_back(Ok(page_of(3, 1, None)));
    let mut dashboard = dashboard(api);
    dashboard.search(SearchQuery::new(SearchType::Term, "asthma")).unwrap();

    let err = dashboard.search(SearchQuery::new(SearchType::Term, "copd")).unwrap_err();

    assert!(matches!(err, DashboardError::Api(ApiError::Http { status: 503, .. })));
    assert_eq!(
        *dashboard.notifier(),
        vec!["Error: API request failed with status 503"]
    );
    assert_eq!(dashboard.state().results.as_ref().unwrap().rows.len(), 3);
}

#[test]
fn paging_after_failed_search_stays_on_shown_results() {
    let api = FakeApi::default();
    api.searches.borrow_mut().push_back(Ok(page_of(20, 1, Some("tok2"))));
    let mut dashboard = dashboard(api);
    dashboard.search(SearchQuery::new(SearchType::Term, "asthma")).unwrap();
    dashboard.search(SearchQuery::new(SearchType::Term, "copd")).unwrap_err();
    assert_eq!(dashboard.state().query.term, "asthma");

    dashboard.api().searches.borrow_mut().push_back(Ok(page_of(20, 2, None)));
    assert!(dashboard.next_page().unwrap());

    let calls = dashboard.api().search_calls.borrow();
    let last = calls.last().unwrap();
    assert_eq!(last.term, "asthma");
    assert_eq!(last.page, 2);
    assert_eq!(last.page_token.as_deref(), Some("tok2"));
}

#[test]
fn failed_id_lookup_keeps_current_query() {
    let api = FakeApi::default();
    api.searches.borrow_mut().push_back(Ok(page_of(3, 1, None)));
    let mut dashboard = dashboard(api);
    dashboard.search(SearchQuery::new(SearchType::Term, "asthma")).unwrap();

    dashboard
        .search(SearchQuery::new(SearchType::NctId, "NCT04280705"))
        .unwrap_err();

    assert_eq!(dashboard.state().query.search_type, SearchType::Term);
    assert_eq!(dashboard.state().query.term, "asthma");
}

#[test]
fn unsuccessful_study_fetch_leaves_detail_untouched() {
    let api = FakeApi::default();
    api.studies
        .borrow_mut()
        .push_back(Ok(study("NCT00000001", "First study")));
    let failure = decode_envelope::<Study>(200, r#"{"success": false}"#)
        .map(|envelope: StudyResponse| envelope.data.unwrap_or_default());
    api.studies.borrow_mut().push_back(failure);
    let mut dashboard = dashboard(api);

    dashboard.view_study("NCT00000001").unwrap();
    let before = dashboard.state().detail.clone();
    let log_before = dashboard.state().log.len();

    assert!(dashboard.view_study("NCT00000002").is_err());

    assert_eq!(dashboard.state().detail, before);
    assert_eq!(dashboard.state().log.len(), log_before + 1);
    assert_eq!(
        dashboard.state().log.last().unwrap().message,
        "Error: API request was not successful"
    );
    assert_eq!(
        *dashboard.notifier(),
        vec!["Error: API request was not successful"]
    );
}

#[test]
fn id_search_opens_study_and_uses_cache() {
    let api = FakeApi::default();
    api.studies
        .borrow_mut()
        .push_back(Ok(study("NCT04280705", "Remdesivir for COVID-19")));
    let mut dashboard = dashboard(api);

    dashboard
        .search(SearchQuery::new(SearchType::NctId, "nct04280705"))
        .unwrap();
    dashboard.view_study("NCT04280705").unwrap();

    assert_eq!(dashboard.state().view, View::StudyDetail);
    let detail = dashboard.state().detail.as_ref().unwrap();
    assert_eq!(detail.title, "Remdesivir for COVID-19");
    assert_eq!(detail.phase, "Phase 3");
    assert_eq!(dashboard.api().study_calls.borrow().len(), 1);
    assert!(dashboard.api().search_calls.borrow().is_empty());
}

#[test]
fn invalid_nct_id_is_reported_once() {
    let mut dashboard = dashboard(FakeApi::default());

    assert!(dashboard.view_study("12345").is_err());

    assert_eq!(*dashboard.notifier(), vec!["Error: invalid NCT ID: 12345"]);
    assert_eq!(dashboard.state().log.len(), 1);
    assert!(dashboard.api().study_calls.borrow().is_empty());
}

#[test]
fn search_all_collects_every_page() {
    let api = FakeApi::default();
    api.searches.borrow_mut().extend([
        Ok(page_of(20, 1, Some("tok2"))),
        Ok(page_of(5, 2, None)),
    ]);
    let mut dashboard = dashboard(api);
    let mut pages = 0;

    let count = dashboard
        .search_all(SearchQuery::new(SearchType::Intervention, "metformin"), |_| pages += 1)
        .unwrap();

    assert_eq!(count, 25);
    assert_eq!(pages, 2);
    let results = dashboard.state().results.as_ref().unwrap();
    assert_eq!(results.rows.len(), 25);
    assert!(results.pagination.is_none());
    assert_eq!(dashboard.state().log.last().unwrap().message, "Fetched 25 studies");
}

#[test]
fn statistics_tolerate_partial_failures() {
    let api = FakeApi::default();
    let status: Vec<FieldValueStats> = serde_json::from_str(
        r#"[{"field": "OverallStatus", "topValues": [
            {"value": "COMPLETED", "studiesCount": 3}, {"value": "RECRUITING", "studiesCount": 1}]}]"#,
    )
    .unwrap();
    api.field_values.borrow_mut().extend([Ok(status), Err(http_error())]);
    *api.sizes.borrow_mut() = Some(Ok(SizeStats {
        total_studies: 500_000,
        average_size_bytes: None,
    }));
    let mut dashboard = dashboard(api);

    dashboard.load_statistics().unwrap();

    let stats = dashboard.state().statistics.as_ref().unwrap();
    assert_eq!(stats.status.as_ref().unwrap().slices[0].to_string(), "COMPLETED: 3 (75%)");
    assert!(stats.phase.is_none());
    assert_eq!(stats.total_studies, Some(500_000));
    assert!(dashboard.notifier().is_empty());
    assert_eq!(
        dashboard.state().log.last().unwrap().message,
        "Statistics loaded (2 of 5 parts)"
    );

    let with_results = dashboard.api().search_calls.borrow()[0].to_params();
    assert!(with_results.contains(&("advanced", "AREA[HasResults]true".to_string())));
    assert!(with_results.contains(&("pageSize", "1".to_string())));
}

#[test]
fn statistics_alert_when_nothing_loads() {
    let mut dashboard = dashboard(FakeApi::default());

    assert!(dashboard.load_statistics().is_err());

    assert_eq!(dashboard.notifier().len(), 1);
    assert!(dashboard.state().statistics.is_none());
}

#[test]
fn success_rates_require_condition_or_intervention() {
    let mut dashboard = dashboard(FakeApi::default());

    let err = dashboard
        .success_rates(SuccessRateQuery {
            phase: Some("PHASE3".to_string()),
            ..SuccessRateQuery::default()
        })
        .unwrap_err();
    assert!(matches!(err, DashboardError::MissingInput(_)));

    assert!(
        dashboard
            .success_rates(SuccessRateQuery {
                condition: Some("asthma".to_string()),
                ..SuccessRateQuery::default()
            })
            .is_err()
    );
    assert_eq!(
        *dashboard.notifier(),
        vec![
            "Please enter at least a condition or intervention to compare",
            "Error: API request was not successful",
        ]
    );
}
