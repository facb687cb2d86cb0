mod common;

use axum::{extract::State, http::StatusCode};
use consult_market_api::routes::health::{health_check, readiness};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
}

#[tokio::test]
async fn readiness_reports_unreachable_database() {
    let (status, body) = readiness(State(common::offline_state())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body.0.success);
    assert_eq!(body.0.data.expect("health data").status, "unavailable");
}
