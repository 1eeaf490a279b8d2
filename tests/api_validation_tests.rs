// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use common::{body_json, get_request, json_request};
use serde_json::json;
use tower::ServiceExt;

mod common;

async fn post_status(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let (app, _) = common::create_test_app();
    let response = app.oneshot(json_request("POST", uri, body)).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_daily_requires_member_ids() {
    for body in [
        json!({ "date": "2025-10-10" }),
        json!({ "memberIds": [], "date": "2025-10-10" }),
        json!({ "memberIds": [0], "date": "2025-10-10" }),
        json!({ "memberIds": ["abc"], "date": "2025-10-10" }),
    ] {
        let (status, response) = post_status("/api/daily-km", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_invalid_date_format() {
    let (status, _) = post_status(
        "/api/daily-km",
        json!({ "memberIds": [1], "date": "2025-13-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weekly_requires_both_dates() {
    let (status, _) = post_status(
        "/api/weekly-km",
        json!({ "memberIds": [1], "startDate": "2025-10-06" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inverted_range_rejected() {
    let (status, response) = post_status(
        "/api/weekly-km",
        json!({ "memberIds": [1], "startDate": "2025-10-12", "endDate": "2025-10-06" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["details"].as_str().unwrap().contains("startDate"));
}

#[tokio::test]
async fn test_overlong_range_rejected() {
    let (status, _) = post_status(
        "/api/weekly-team-km",
        json!({ "startDate": "2025-01-01", "endDate": "2025-12-31" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_team_sort_key_rejected() {
    let (status, _) = post_status(
        "/api/weekly-team-km",
        json!({ "startDate": "2025-10-06", "endDate": "2025-10-12", "sortBy": "members" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_path_parameters() {
    for uri in [
        "/api/race/personal/abc",
        "/api/race/personal/0",
        "/api/member/xyz",
        "/api/member/0",
        "/api/member/5?startDate=yesterday",
    ] {
        let (app, _) = common::create_test_app();
        let response = app.oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["buildId"].is_string());
}
