//! Behavior tests for the dispatch facade: retry, pagination, parameter
//! handling, and result shape as observed by a caller.

mod support;

use std::time::Duration;

use serde_json::json;

use marketgate_core::{
    ApiVersion, CallRequest, DispatcherBuilder, ErrorKind, HttpError, HttpResponse, Pagination,
    RetryConfig,
};

use support::{dispatcher_with, ScriptedHttpClient};

#[tokio::test]
async fn successful_quote_payload_is_returned_unchanged() {
    let client = ScriptedHttpClient::ok_json(&[r#"[{"symbol":"AAPL","price":150.0}]"#]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "quote")
        .with_param("symbol", "AAPL")
        .with_param("apikey", "VALIDKEY");
    let payload = dispatcher.dispatch(request).await.expect("dispatch succeeds");

    assert_eq!(payload, json!([{"symbol": "AAPL", "price": 150.0}]));
    assert_eq!(client.request_count(), 1);

    let url = &client.recorded_urls()[0];
    assert!(url.contains("/stable/quote?"));
    assert!(url.contains("apikey=VALIDKEY"));
    assert!(url.contains("symbol=AAPL"));
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::with_status(503, "maintenance")),
        Ok(HttpResponse::with_status(503, "maintenance")),
        Ok(HttpResponse::ok_json(r#"[{"symbol":"AAPL"}]"#)),
    ]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "quote")
        .with_param("symbol", "AAPL")
        .with_param("apikey", "k");
    let payload = dispatcher.dispatch(request).await.expect("third attempt succeeds");

    assert_eq!(payload, json!([{"symbol": "AAPL"}]));
    assert_eq!(client.request_count(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_failure() {
    // max_retries = 3, so four attempts total.
    let client = ScriptedHttpClient::repeated_status(503, "still down", 4);
    let dispatcher = dispatcher_with(client.clone());

    let request =
        CallRequest::get(ApiVersion::Stable, "quote").with_param("apikey", "k");
    let error = dispatcher.dispatch(request).await.expect_err("all attempts fail");

    assert_eq!(error.kind(), ErrorKind::UpstreamError);
    assert_eq!(error.http_status, Some(503));
    assert!(error.retryable());
    assert_eq!(client.request_count(), 4);
}

#[tokio::test]
async fn non_retryable_status_makes_exactly_one_attempt() {
    let client = ScriptedHttpClient::repeated_status(404, "no such endpoint", 4);
    let dispatcher = dispatcher_with(client.clone());

    let request =
        CallRequest::get(ApiVersion::Stable, "nope").with_param("apikey", "k");
    let error = dispatcher.dispatch(request).await.expect_err("404 fails");

    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert!(!error.retryable());
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn transport_failures_are_retried_then_classified() {
    let client = ScriptedHttpClient::new(vec![
        Err(HttpError::new("request timeout")),
        Err(HttpError::new("request timeout")),
        Err(HttpError::new("request timeout")),
        Err(HttpError::new("request timeout")),
    ]);
    let dispatcher = dispatcher_with(client.clone());

    let request =
        CallRequest::get(ApiVersion::Stable, "quote").with_param("apikey", "k");
    let error = dispatcher.dispatch(request).await.expect_err("transport fails");

    assert_eq!(error.kind(), ErrorKind::ClientTransportError);
    assert_eq!(error.http_status, None);
    assert!(!error.retryable());
    assert_eq!(client.request_count(), 4);
}

#[tokio::test]
async fn pagination_concatenates_pages_in_order_until_empty() {
    let client = ScriptedHttpClient::ok_json(&[
        r#"[{"page":0,"row":"a"},{"page":0,"row":"b"}]"#,
        r#"[{"page":1,"row":"c"}]"#,
        r#"[{"page":2,"row":"d"}]"#,
        "[]",
    ]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "profile-bulk")
        .with_param("apikey", "k")
        .with_pagination(Pagination::new("page", 0, 10).expect("valid pagination"));
    let payload = dispatcher.dispatch(request).await.expect("pagination succeeds");

    assert_eq!(
        payload,
        json!([
            {"page": 0, "row": "a"},
            {"page": 0, "row": "b"},
            {"page": 1, "row": "c"},
            {"page": 2, "row": "d"},
        ])
    );
    // Three data pages plus the empty terminator.
    assert_eq!(client.request_count(), 4);

    let urls = client.recorded_urls();
    assert!(urls[0].contains("page=0"));
    assert!(urls[3].contains("page=3"));
}

#[tokio::test]
async fn pagination_stops_at_the_page_bound() {
    let client = ScriptedHttpClient::ok_json(&[r#"[1]"#, r#"[2]"#, r#"[3]"#]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "profile-bulk")
        .with_param("apikey", "k")
        .with_pagination(Pagination::new("page", 0, 2).expect("valid pagination"));
    let payload = dispatcher.dispatch(request).await.expect("pagination succeeds");

    assert_eq!(payload, json!([1, 2]));
    assert_eq!(client.request_count(), 2);
}

#[tokio::test]
async fn pagination_failure_discards_accumulated_pages() {
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok_json(r#"[{"row":"kept so far"}]"#)),
        Ok(HttpResponse::with_status(500, "boom")),
        Ok(HttpResponse::with_status(500, "boom")),
        Ok(HttpResponse::with_status(500, "boom")),
        Ok(HttpResponse::with_status(500, "boom")),
    ]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "profile-bulk")
        .with_param("apikey", "k")
        .with_pagination(Pagination::new("page", 0, 3).expect("valid pagination"));
    let error = dispatcher.dispatch(request).await.expect_err("page two fails");

    assert_eq!(error.kind(), ErrorKind::UpstreamError);
    // Page one plus four attempts at page two.
    assert_eq!(client.request_count(), 5);
}

#[tokio::test]
async fn non_list_page_is_appended_whole_and_stops_accumulation() {
    let client = ScriptedHttpClient::ok_json(&[r#"{"symbol":"AAPL","price":150.0}"#, "[]"]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "quote")
        .with_param("apikey", "k")
        .with_pagination(Pagination::new("page", 0, 5).expect("valid pagination"));
    let payload = dispatcher.dispatch(request).await.expect("dispatch succeeds");

    assert_eq!(payload, json!([{"symbol": "AAPL", "price": 150.0}]));
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn missing_credential_short_circuits_without_network_calls() {
    let client = ScriptedHttpClient::ok_json(&[r#"[{"unreachable":true}]"#]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "quote").with_param("symbol", "AAPL");
    let error = dispatcher.dispatch(request).await.expect_err("no credential");

    assert_eq!(error.kind(), ErrorKind::MissingCredential);
    assert_eq!(error.http_status, None);
    assert!(!error.retryable());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn symbol_convenience_defers_to_an_explicit_parameter() {
    let client = ScriptedHttpClient::ok_json(&["[]", "[]"]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "quote")
        .with_param("apikey", "k")
        .with_symbol("AAPL");
    dispatcher.dispatch(request).await.expect("dispatch succeeds");

    let request = CallRequest::get(ApiVersion::Stable, "quote")
        .with_param("apikey", "k")
        .with_param("symbol", "MSFT")
        .with_symbol("AAPL");
    dispatcher.dispatch(request).await.expect("dispatch succeeds");

    let urls = client.recorded_urls();
    assert!(urls[0].contains("symbol=AAPL"));
    assert!(urls[1].contains("symbol=MSFT"));
    assert!(!urls[1].contains("symbol=AAPL"));
}

#[tokio::test]
async fn repeated_dispatches_produce_identical_payloads() {
    let body = r#"[{"symbol":"AAPL","price":150.0}]"#;
    let client = ScriptedHttpClient::ok_json(&[body, body]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::Stable, "quote")
        .with_param("symbol", "AAPL")
        .with_param("apikey", "k");

    let first = dispatcher.dispatch(request.clone()).await.expect("first call");
    let second = dispatcher.dispatch(request).await.expect("second call");

    assert_eq!(first, second);
    let urls = client.recorded_urls();
    assert_eq!(urls[0], urls[1]);
}

#[tokio::test]
async fn invoke_merges_catalog_defaults_under_overrides() {
    let client = ScriptedHttpClient::ok_json(&["[]"]);
    let dispatcher = dispatcher_with(client.clone());

    let mut overrides = std::collections::BTreeMap::new();
    overrides.insert(String::from("symbol"), String::from("AAPL"));
    overrides.insert(String::from("apikey"), String::from("k"));
    overrides.insert(String::from("period"), String::from("quarter"));

    dispatcher
        .invoke("income_statement", overrides, None)
        .await
        .expect("invoke succeeds");

    let url = &client.recorded_urls()[0];
    assert!(url.contains("/stable/income-statement?"));
    // Catalog default survives where not overridden; override wins elsewhere.
    assert!(url.contains("limit=1"));
    assert!(url.contains("period=quarter"));
    assert!(url.contains("symbol=AAPL"));
}

#[tokio::test]
async fn raw_passthrough_paths_skip_the_version_prefix() {
    let client = ScriptedHttpClient::ok_json(&["[]"]);
    let dispatcher = dispatcher_with(client.clone());

    let request = CallRequest::get(ApiVersion::V4, "/api/v3/quote").with_param("apikey", "k");
    dispatcher.dispatch(request).await.expect("dispatch succeeds");

    let url = &client.recorded_urls()[0];
    assert!(url.contains("/api/v3/quote?"));
    assert!(!url.contains("/api/v4/"));
}

#[tokio::test]
async fn attempt_timeout_is_carried_on_every_request() {
    let client = ScriptedHttpClient::ok_json(&["[]"]);
    let dispatcher = DispatcherBuilder::new()
        .with_http_client(client.clone())
        .with_retry(RetryConfig {
            attempt_timeout: Duration::from_secs(5),
            ..RetryConfig::fixed(Duration::from_millis(1), 0)
        })
        .with_fallback_credential("k")
        .build();

    let request = CallRequest::get(ApiVersion::Stable, "quote");
    dispatcher.dispatch(request).await.expect("dispatch succeeds");

    let requests = client.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].timeout_ms, 5_000);
}
