use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use salary_bench::{
    api::{router, AppState},
    config::Settings,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let app = router(AppState::new(Settings::default()).unwrap());
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn analyze_uses_supplied_rates() {
    let (status, body) = post_json(
        "/benchmark/analyze",
        json!({
            "postings": [
                {"id": "1", "title": "Analyst", "salary_from": 1000.0, "currency": "USD"},
                {"id": "2", "title": "Analyst", "salary_from": 2000.0, "salary_to": 4000.0, "currency": "BYN", "salary_kind": "net"},
                {"id": "3", "title": "Analyst"}
            ],
            "rates": {"USD": 3.0}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "partial");
    assert_eq!(body["total_postings"], 3);
    assert_eq!(body["filtered_count"], 3);
    assert_eq!(body["counts"]["without_salary"], 1);
    assert_eq!(body["gross"]["count"], 2);
    assert_eq!(body["net"]["max"], 3000.0);
    assert_eq!(body["table"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn analyze_without_needed_rates_is_unavailable() {
    let (status, _) = post_json(
        "/benchmark/analyze",
        json!({
            "postings": [{"id": "1", "salary_from": 1000.0, "currency": "EUR"}],
            "rates": {}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn blank_search_is_rejected() {
    let (status, _) = post_json("/benchmark/search", json!({"include": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
