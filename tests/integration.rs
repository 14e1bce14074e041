//! End-to-end tests for the attendance engine.
//!
//! Every scenario goes through the HTTP router:
//! - Employees with no activity
//! - Sunday evening overtime split
//! - Weekday regular-hour quota across two punch pairs
//! - Leave precedence over assignments
//! - Short sick-leave relabeling
//! - Undefined discipline score
//! - Idempotent reruns
//! - Ingestion warnings and manual assignments
//! - Error cases

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

use attendance_engine::api::{create_router, AppState};
use attendance_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/standard").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

async fn post_report(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reports")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn punch_table(rows: &[(&str, &str)]) -> Value {
    let mut table = vec![json!(["Matricule", "Date pointage"])];
    table.extend(rows.iter().map(|(id, ts)| json!([id, ts])));
    Value::Array(table)
}

/// March 2025: starts on a Saturday, 5 Sundays, 26 eligible workdays.
fn march_request(punches: Value) -> Value {
    json!({
        "month": 3,
        "year": 2025,
        "holidays": [],
        "punches": punches
    })
}

fn row_for<'a>(report: &'a Value, employee_id: &str) -> &'a Value {
    report["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["employee_id"] == employee_id)
        .unwrap_or_else(|| panic!("no row for employee {}", employee_id))
}

fn assert_decimal(actual: &Value, expected: &str) {
    let actual = Decimal::from_str(actual.as_str().unwrap()).unwrap();
    let expected = Decimal::from_str(expected).unwrap();
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Expected {}, got {}",
        expected,
        actual
    );
}

fn assert_buckets(buckets: &Value, regular: &str, ot25: &str, ot50: &str, ot100: &str) {
    assert_decimal(&buckets["regular"], regular);
    assert_decimal(&buckets["ot25"], ot25);
    assert_decimal(&buckets["ot50"], ot50);
    assert_decimal(&buckets["ot100"], ot100);
}

// =============================================================================
// Employees with no activity in the month
// =============================================================================

#[tokio::test]
async fn test_employee_without_activity_is_absent_every_workday() {
    // Only a February punch: the employee exists but has nothing in March
    let body = march_request(punch_table(&[("5", "28/02/2025 08:30")]));
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "5");
    assert_buckets(&row["total_hours"], "0", "0", "0", "0");
    assert_decimal(&row["unjustified_absence_days"], "26");
    assert_eq!(row["eligible_workdays"], 26);
    assert_eq!(row["expected_days"], 26);
    // 26 x 4 penalty points over 26 expected days
    assert_eq!(row["discipline_score"], "0.00");
    assert_decimal(&row["paid_days"], "0");
}

// =============================================================================
// Overtime tiers
// =============================================================================

#[tokio::test]
async fn test_sunday_evening_split_into_ot50_and_ot100() {
    let body = march_request(punch_table(&[
        ("6", "16/03/2025 20:00"),
        ("6", "16/03/2025 23:00"),
    ]));
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "6");
    assert_buckets(&row["total_hours"], "0", "0", "1", "2");
    assert_decimal(&row["majorations"]["ot50"], "0.5");
    assert_decimal(&row["majorations"]["ot100"], "2");
    assert_decimal(&row["majorations"]["total"], "2.5");
}

#[tokio::test]
async fn test_weekday_quota_across_two_pairs() {
    let body = march_request(punch_table(&[
        ("7", "03/03/2025 08:00"),
        ("7", "03/03/2025 12:00"),
        ("7", "03/03/2025 13:00"),
        ("7", "03/03/2025 19:00"),
    ]));
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "7");
    assert_buckets(&row["office_hours"], "8", "0.5", "0", "0");
    assert_decimal(&row["lunch_hours"], "1.5");
    assert_eq!(row["late_count"], 0);
}

// =============================================================================
// Leave handling
// =============================================================================

#[tokio::test]
async fn test_leave_wins_over_assignment() {
    let mut body = march_request(punch_table(&[]));
    body["leaves"] = json!([
        ["Matricule", "Type de congé", "Date début", "Date fin"],
        ["9", "Congé payé", "04/03/2025", "04/03/2025"]
    ]);
    body["assignments"] = json!([
        ["Matricule", "Date", "Affectation", "Lieu"],
        ["9", "04/03/2025", "Chantier", "Tower B"]
    ]);
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "9");
    assert_eq!(row["site_days"], 0);
    assert_eq!(row["site_locations"], "");
    assert_eq!(row["leave"]["employer_paid_days"], 1);
    assert_eq!(row["leave"]["types_detail"], "CONGE_PAYE");
    assert_eq!(row["expected_days"], 25);
}

#[tokio::test]
async fn test_two_day_sick_leave_becomes_short_sick_leave() {
    let mut body = march_request(punch_table(&[]));
    body["leaves"] = json!([
        ["Matricule", "Motif", "Début", "Fin"],
        ["11", "Arrêt maladie", "04/03/2025", "05/03/2025"]
    ]);
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "11");
    assert_eq!(row["leave"]["types_detail"], "CONGE_MALADIE_COURT");
    assert_eq!(row["leave"]["unpaid_days"], 2);
    assert_eq!(row["leave"]["social_security_days"], 0);
}

#[tokio::test]
async fn test_month_on_leave_has_undefined_score() {
    let mut body = march_request(punch_table(&[]));
    body["leaves"] = json!([
        ["Matricule", "Motif", "Début", "Fin"],
        ["12", "Congé sans solde", "01/03/2025", "31/03/2025"]
    ]);
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "12");
    assert_eq!(row["expected_days"], 0);
    assert_eq!(row["discipline_score"], "—");
    assert_decimal(&row["unjustified_absence_days"], "0");
}

// =============================================================================
// Report shape
// =============================================================================

#[tokio::test]
async fn test_rerun_gives_identical_rows() {
    let mut body = march_request(punch_table(&[
        ("2", "03/03/2025 08:55"),
        ("2", "03/03/2025 18:30"),
        ("10", "04/03/2025 08:30"),
        ("10", "04/03/2025 12:30"),
    ]));
    body["leaves"] = json!([
        ["Matricule", "Motif", "Début", "Fin"],
        ["2", "Congé annuel", "10/03/2025", "14/03/2025"]
    ]);

    let (_, first) = post_report(create_router_for_test(), body.clone()).await;
    let (_, second) = post_report(create_router_for_test(), body).await;

    assert_eq!(first["rows"], second["rows"]);
    assert_ne!(first["report_id"], second["report_id"]);
}

#[tokio::test]
async fn test_rows_sorted_by_numeric_employee_id() {
    let body = march_request(punch_table(&[
        ("10", "03/03/2025 08:30"),
        ("9", "03/03/2025 08:30"),
        ("100", "03/03/2025 08:30"),
    ]));
    let (_, report) = post_report(create_router_for_test(), body).await;

    let ids: Vec<&str> = report["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["employee_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["9", "10", "100"]);
}

#[tokio::test]
async fn test_late_arrival_is_counted() {
    // 08:55 is past 08:30 plus the 20 minute tolerance
    let body = march_request(punch_table(&[
        ("2", "03/03/2025 08:55"),
        ("2", "03/03/2025 18:30"),
    ]));
    let (_, report) = post_report(create_router_for_test(), body).await;

    let row = row_for(&report, "2");
    assert_eq!(row["late_count"], 1);
}

#[tokio::test]
async fn test_audit_trace_records_each_pass() {
    let body = march_request(punch_table(&[("3", "03/03/2025 08:30")]));
    let (_, report) = post_report(create_router_for_test(), body).await;

    let rule_ids: Vec<&str> = report["audit_trace"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["rule_id"].as_str().unwrap())
        .collect();
    assert_eq!(
        rule_ids,
        vec!["input_summary", "daily_classification", "monthly_aggregation"]
    );
    assert_eq!(report["engine_version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Ingestion
// =============================================================================

#[tokio::test]
async fn test_headerless_table_and_bad_rows_produce_warnings() {
    let body = march_request(json!([
        ["4", "2025-03-03 08:30"],
        ["4", "not a timestamp"],
        ["4", "2025-03-03 18:30"]
    ]));
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = report["audit_trace"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"HEADER_NOT_DETECTED"));
    assert!(codes.contains(&"ROW_DROPPED"));

    let row = row_for(&report, "4");
    assert_buckets(&row["office_hours"], "8", "0", "0", "0");
}

#[tokio::test]
async fn test_duplicate_punches_are_collapsed() {
    // The 08:35 punch repeats the 08:30 one and must not pair with it
    let body = march_request(punch_table(&[
        ("8", "03/03/2025 08:30"),
        ("8", "03/03/2025 08:35"),
        ("8", "03/03/2025 18:30"),
    ]));
    let (_, report) = post_report(create_router_for_test(), body).await;

    let row = row_for(&report, "8");
    assert_buckets(&row["office_hours"], "8", "0", "0", "0");
    let orphan = report["audit_trace"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w["code"] == "ORPHAN_PUNCH");
    assert!(!orphan);
}

#[tokio::test]
async fn test_manual_assignment_overrides_file() {
    let mut body = march_request(punch_table(&[]));
    body["assignments"] = json!([
        ["Matricule", "Date", "Affectation", "Lieu", "Projet"],
        ["13", "05/03/2025", "Chantier", "Dock", ""]
    ]);
    body["manual_assignments"] = json!([{
        "employee_id": "13",
        "date": "2025-03-05",
        "assignment_kind": "home",
        "home_project": "Migration"
    }]);
    let (status, report) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let row = row_for(&report, "13");
    assert_eq!(row["home_days"], 1);
    assert_eq!(row["site_days"], 0);
    assert_eq!(row["home_projects"], "Migration");
    assert_buckets(&row["home_hours"], "8", "0", "0", "0");
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_invalid_month_returns_invalid_period() {
    let mut body = march_request(punch_table(&[]));
    body["month"] = json!(0);
    let (status, error) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reports")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"month\": 3,"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_field_type_returns_malformed_json() {
    let body = json!({
        "month": "March",
        "year": 2025,
        "punches": []
    });
    let (status, error) = post_report(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}
