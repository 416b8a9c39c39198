mod common;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stationery_client::models::reports::{ReportFormat, ReportQuery, ReportType};
use stationery_client::ReportsClient;

#[tokio::test]
async fn fetch_sends_the_filters_and_parses_data_and_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/"))
        .and(query_param("type", "stock"))
        .and(query_param("start_date", "2025-03-01"))
        .and(query_param("end_date", "2025-03-31"))
        .and(query_param("category", "Writing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "stock",
            "data": [
                {"name": "Pencils", "category": "Writing", "quantity": 120, "usage": 30, "status": "in_stock"}
            ],
            "stats": {"total_items": 1, "low_stock": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut query = ReportQuery::new(ReportType::Stock);
    query.start_date = Some("2025-03-01".to_string());
    query.end_date = Some("2025-03-31".to_string());
    query.category = "Writing".to_string();

    let reports = ReportsClient::new(common::session_client(&server));
    let bundle = reports.fetch(&query).await.unwrap();
    assert_eq!(bundle.data.len(), 1);
    assert_eq!(bundle.stats["total_items"], 1);
}

#[tokio::test]
async fn empty_dates_are_omitted_from_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/"))
        .and(query_param("type", "teacher"))
        .and(query_param("category", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "stats": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut query = ReportQuery::new(ReportType::Teacher);
    query.start_date = Some(String::new());

    let reports = ReportsClient::new(common::session_client(&server));
    reports.fetch(&query).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let query_string = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!query_string.contains("start_date"));
    assert!(!query_string.contains("end_date"));
}

#[tokio::test]
async fn export_names_the_file_from_the_content_disposition_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/export/"))
        .and(query_param("format", "pdf"))
        .and(query_param("type", "requests"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    r#"attachment; filename="march_requests.pdf""#,
                )
                .set_body_bytes(b"%PDF-1.7 fake".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let reports = ReportsClient::new(common::session_client(&server));
    let written = reports
        .export(
            &ReportQuery::new(ReportType::Requests),
            ReportFormat::Pdf,
            dir.path(),
        )
        .await
        .unwrap();

    assert_eq!(written.file_name().unwrap(), "march_requests.pdf");
    assert_eq!(std::fs::read(&written).unwrap(), b"%PDF-1.7 fake");
}

#[tokio::test]
async fn export_falls_back_to_a_derived_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/export/"))
        .and(query_param("format", "excel"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let reports = ReportsClient::new(common::session_client(&server));
    let written = reports
        .export(
            &ReportQuery::new(ReportType::Stock),
            ReportFormat::Excel,
            dir.path(),
        )
        .await
        .unwrap();

    // `excel` on the wire, `.xlsx` on disk
    assert_eq!(written.file_name().unwrap(), "stock_report.xlsx");
}

#[tokio::test]
async fn a_hostile_disposition_filename_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/export/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    r#"attachment; filename="../../outside.pdf""#,
                )
                .set_body_bytes(b"data".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let reports = ReportsClient::new(common::session_client(&server));
    let written = reports
        .export(
            &ReportQuery::new(ReportType::Movement),
            ReportFormat::Pdf,
            dir.path(),
        )
        .await
        .unwrap();

    assert_eq!(written.file_name().unwrap(), "movement_report.pdf");
    assert!(written.starts_with(dir.path()));
}
