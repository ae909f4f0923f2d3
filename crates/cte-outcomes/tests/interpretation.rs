use cte_model::{OutcomeMeasure, Study};
use cte_outcomes::{Heuristics, OutcomeShape, classify, interpret, visualize_study};

fn outcome(json: &str) -> OutcomeMeasure {
    serde_json::from_str(json).unwrap()
}

fn render(outcome: &OutcomeMeasure, shape: OutcomeShape) -> String {
    interpret(outcome, shape, &Heuristics::default())
        .to_string()
        .trim_end()
        .to_string()
}

#[test]
fn test_distribution_interpretation() {
    let o = outcome(
        r#"{"title": "Change in MADRS Total Score", "paramType": "MEAN",
            "dispersionType": "STANDARD_DEVIATION",
            "groups": [{"id": "OG000", "title": "Placebo"}, {"id": "OG001", "title": "Esketamine Treatment"}],
            "classes": [{"categories": [{"measurements": [
                {"groupId": "OG000", "value": "-12.1", "spread": "8.2"},
                {"groupId": "OG001", "value": "-19.8", "spread": "9.0"}]}]}],
            "analyses": [{"pValue": "0.003", "statisticalMethod": "ANCOVA",
                          "ciLowerLimit": "-12.1", "ciUpperLimit": "-3.3"}]}"#,
    );
    assert_eq!(classify(&o), OutcomeShape::Distribution);
    insta::assert_snapshot!(render(&o, OutcomeShape::Distribution), @r"
    Distribution Analysis:
    Change in MADRS Total Score

    Group Comparisons:
    - Placebo: Mean = -12.10, SD = 8.20
    - Esketamine Treatment: Mean = -19.80, SD = 9.00

    Statistical Analysis:
    p-value: 0.003
    Method: ANCOVA
    95% CI: [-12.1, -3.3]

    Clinical Interpretation:
    The experimental group showed a 63.6% better outcome compared to control.
    ");
}

#[test]
fn test_distribution_without_keywords_uses_first_two_groups() {
    let o = outcome(
        r#"{"title": "Overall Survival", "paramType": "MEAN",
            "dispersionType": "STANDARD_DEVIATION",
            "groups": [{"id": "OG000", "title": "Arm A"}, {"id": "OG001", "title": "Arm B"}],
            "classes": [{"categories": [{"measurements": [
                {"groupId": "OG000", "value": "10", "spread": "2"},
                {"groupId": "OG001", "value": "12", "spread": "2"}]}]}]}"#,
    );
    let text = render(&o, OutcomeShape::Distribution);
    assert!(text.ends_with(
        "The experimental group showed a 20.0% better outcome compared to control."
    ));
}

#[test]
fn test_categorical_interpretation() {
    let o = outcome(
        r#"{"title": "Response Rate",
            "groups": [{"id": "OG000", "title": "Drug"}, {"id": "OG001", "title": "Placebo"}],
            "classes": [{"categories": [
                {"title": "Responder", "measurements": [
                    {"groupId": "OG000", "value": "30"}, {"groupId": "OG001", "value": "12"}]},
                {"title": "Non-responder", "measurements": [{"groupId": "OG000", "value": "20"}]}
            ]}],
            "analyses": [{"pValue": "<0.001", "ciPctValue": "90",
                          "ciLowerLimit": "1.2", "ciUpperLimit": "3.4"}]}"#,
    );
    assert_eq!(classify(&o), OutcomeShape::Categorical);
    insta::assert_snapshot!(render(&o, OutcomeShape::Categorical), @r"
    Categorical Analysis:
    Response Rate

    Category Values:
    Category | Drug | Placebo
    Responder | 30.00 | 12.00
    Non-responder | 20.00 | N/A

    Statistical Analysis:
    p-value: <0.001
    90% CI: [1.2, 3.4]
    ");
}

#[test]
fn test_time_series_interpretation() {
    let o = outcome(
        r#"{"title": "Total Symptom Score",
            "groups": [{"id": "OG000", "title": "Drug"}, {"id": "OG001", "title": "Placebo"}],
            "classes": [
                {"title": "Week 8", "categories": [{"measurements": [{"groupId": "OG000", "value": "10"}]}]},
                {"title": "Baseline", "categories": [{"measurements": [
                    {"groupId": "OG000", "value": "20"}, {"groupId": "OG001", "value": "21"}]}]},
                {"title": "Week 4", "categories": [{"measurements": [
                    {"groupId": "OG000", "value": "15"}, {"groupId": "OG001", "value": "19"}]}]}
            ]}"#,
    );
    insta::assert_snapshot!(render(&o, OutcomeShape::TimeSeries), @r"
    Time Series Analysis:
    Total Symptom Score

    Change from Baseline to Week 8:
    - Drug: 50.0% decrease (improvement)
    ");
}

#[test]
fn test_fallback_interpretation() {
    let o = outcome(
        r#"{"title": "Overall Survival", "description": "Median OS", "unitOfMeasure": "months",
            "groups": [{"id": "OG000", "title": "Drug"}, {"id": "OG001", "title": "Placebo"}],
            "classes": [
                {"categories": [{"measurements": [{"groupId": "OG000", "value": "14.5"}]}]},
                {"categories": [{"measurements": [{"groupId": "OG001", "value": "11"}]}]}
            ]}"#,
    );
    assert_eq!(classify(&o), OutcomeShape::Fallback);
    insta::assert_snapshot!(render(&o, OutcomeShape::Fallback), @r"
    Outcome Summary:
    Overall Survival
    Median OS

    Values:
    - Drug: 14.5 months
    - Placebo: 11 months
    ");
}

#[test]
fn test_malformed_outcome_degrades_to_placeholders() {
    let o = OutcomeMeasure::default();
    let text = render(&o, OutcomeShape::Distribution);
    assert!(text.starts_with("Distribution Analysis:\nOutcome Measure"));
    assert!(!text.contains("Clinical Interpretation"));
}

#[test]
fn test_study_outcomes_ordered_primary_first() {
    let study: Study = serde_json::from_str(
        r#"{"resultsSection": {"outcomeMeasuresModule": {"outcomeMeasures": [
            {"type": "OTHER_PRE_SPECIFIED", "title": "Other"},
            {"type": "SECONDARY", "title": "Second"},
            {"type": "PRIMARY", "title": "First"}
        ]}}}"#,
    )
    .unwrap();
    let titles: Vec<_> = visualize_study(&study, &Heuristics::default())
        .into_iter()
        .map(|v| v.chart.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Other"]);
}
