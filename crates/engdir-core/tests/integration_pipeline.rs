//! Integration test: local JSON server standing in for the registry.
//!
//! Exercises the curl fetcher, the full pipeline and the export against real
//! HTTP, including failing detail endpoints and a failing listing.

mod common;

use common::json_server::{self, JsonServer, Route};
use engdir_core::export::{write_result_set, ExportOptions};
use engdir_core::fetch::{CurlFetcher, FailureKind, FetchError, JsonSource};
use engdir_core::listing::ListingError;
use engdir_core::pipeline::{run_pipeline, PipelineOptions, RowOrdering, SharedSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const LIST: &str = "/inka.php";
const DETAIL: &str = "/inka.php?action=member_info&inka_id=";

fn detail_body(id: &str) -> String {
    format!(
        r#"[{{"anrede":"Frau","titel":"Dr.-Ing.","vorname":"Eva","nachname":"Nr{id}",
            "firma":["Büro {id}",null,""],"ort":"Cottbus","plz":"03046","str":"Markt {id}",
            "fachrichtung":["Statik","Brandschutz"],"taetigkeit":[],"bi":"1",
            "description":"&lt;p&gt;Planung &amp;amp; Beratung&lt;/p&gt;"}}]"#
    )
}

/// Members 1..=3 answer normally, 4 returns HTTP 500, 5 has no route (404),
/// 6 hangs up; one listing entry has no ident.
fn registry() -> JsonServer {
    let mut routes = HashMap::new();
    routes.insert(
        LIST.to_string(),
        Route::json(
            r#"[{"ident":"1"},{"ident":"2"},{"name":"no ident"},{"ident":3},{"ident":"4"},{"ident":"5"},{"ident":"6"}]"#,
        ),
    );
    for id in ["1", "2", "3"] {
        routes.insert(format!("{DETAIL}{id}"), Route::json(detail_body(id)));
    }
    routes.insert(format!("{DETAIL}4"), Route::status(500));
    routes.insert(format!("{DETAIL}6"), Route::hang_up());
    json_server::start(routes)
}

fn fetcher() -> SharedSource {
    Arc::new(CurlFetcher::new(Duration::from_secs(5), Duration::from_secs(10)))
}

fn options(server: &JsonServer, workers: usize) -> PipelineOptions {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), "engdir-test/1.0".to_string());
    PipelineOptions {
        listing_url: server.url(LIST),
        detail_prefix: server.url(DETAIL),
        headers,
        workers,
        ordering: RowOrdering::Completion,
    }
}

fn sorted_lines(path: &std::path::Path) -> Vec<String> {
    let content = std::fs::read_to_string(path).unwrap();
    let mut lines: Vec<String> = content.lines().skip(1).map(str::to_string).collect();
    lines.sort();
    lines
}

#[test]
fn fetcher_posts_with_user_agent() {
    let server = registry();
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), "engdir-test/1.0".to_string());
    let value = CurlFetcher::default()
        .fetch_json(&server.url(LIST), &headers)
        .unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(7));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, LIST);
    assert_eq!(
        requests[0].headers.get("user-agent").map(String::as_str),
        Some("engdir-test/1.0")
    );
}

#[test]
fn fetcher_failures_are_typed() {
    let mut routes = HashMap::new();
    routes.insert("/html".to_string(), Route::json("<html>maintenance</html>"));
    routes.insert("/empty".to_string(), Route::json(""));
    routes.insert("/bye".to_string(), Route::hang_up());
    let server = json_server::start(routes);
    let f = CurlFetcher::default();
    let h = HashMap::new();

    let err = f.fetch_json(&server.url("/missing"), &h).unwrap_err();
    assert!(matches!(err, FetchError::Http(404)));

    let err = f.fetch_json(&server.url("/html"), &h).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Decode);

    let err = f.fetch_json(&server.url("/empty"), &h).unwrap_err();
    assert!(matches!(err, FetchError::EmptyBody));

    let err = f.fetch_json(&server.url("/bye"), &h).unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert_eq!(err.kind(), FailureKind::Connection);
}

#[test]
fn pipeline_exports_rows_and_blank_failures() {
    let server = registry();
    let results = run_pipeline(fetcher(), &options(&server, 4), None).unwrap();
    assert_eq!(results.len(), 6);
    assert_eq!(results.failed(), 3);

    let summary = results.summary();
    assert_eq!(summary.by_kind.get(&FailureKind::Http), Some(&2));
    assert_eq!(summary.by_kind.get(&FailureKind::Connection), Some(&1));

    let row = results
        .rows()
        .find(|r| r.expert.ends_with("Nr3"))
        .expect("member 3 (numeric ident) normalized");
    assert_eq!(row.expert, "Frau Dr.-Ing. Eva Nr3");
    assert_eq!(row.company, "Büro 3");
    assert_eq!(row.specialization, "Statik, Brandschutz");
    assert_eq!(row.activity, "");
    assert_eq!(row.description, "Planung & Beratung");

    let dir = tempdir().unwrap();
    let path = dir.path().join("output.csv");
    let written = write_result_set(&path, &results, &ExportOptions::default()).unwrap();
    assert_eq!(written, 6);
    let lines = sorted_lines(&path);
    assert_eq!(lines.len(), 6);
    let blank = ",".repeat(14);
    assert_eq!(lines.iter().filter(|l| **l == blank).count(), 3);
}

#[test]
fn repeated_runs_and_pool_sizes_give_same_content() {
    let server = registry();
    let dir = tempdir().unwrap();
    let mut outputs = Vec::new();
    for (i, workers) in [10usize, 10, 1].into_iter().enumerate() {
        let results = run_pipeline(fetcher(), &options(&server, workers), None).unwrap();
        let path = dir.path().join(format!("run{i}.csv"));
        write_result_set(&path, &results, &ExportOptions::default()).unwrap();
        outputs.push(sorted_lines(&path));
    }
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test]
fn listing_order_option_matches_listing() {
    let server = registry();
    let mut opts = options(&server, 6);
    opts.ordering = RowOrdering::Listing;
    let results = run_pipeline(fetcher(), &opts, None).unwrap();
    let urls: Vec<String> = results.iter().map(|e| e.url.clone()).collect();
    let expected: Vec<String> = ["1", "2", "3", "4", "5", "6"]
        .iter()
        .map(|id| server.url(&format!("{DETAIL}{id}")))
        .collect();
    assert_eq!(urls, expected);
}

#[test]
fn failing_listing_aborts_run() {
    let server = json_server::start(HashMap::new());
    let err = run_pipeline(fetcher(), &options(&server, 2), None).unwrap_err();
    assert!(matches!(err, ListingError::Fetch(FetchError::Http(404))));
    // No detail request was attempted.
    assert_eq!(server.requests().len(), 1);
}
