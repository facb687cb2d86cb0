mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use consult_market_api::{app::build_router, middleware::auth::Role};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use common::{bearer, offline_state};

async fn send(
    method: Method,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = build_router(offline_state()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn booking(overrides: Value) -> Value {
    let mut body = json!({
        "consultant_id": Uuid::new_v4(),
        "slot_id": Uuid::new_v4(),
        "client_name": "Asha",
        "client_email": "asha@example.com",
        "client_phone": "9999999999",
        "price": 500
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    body
}

#[tokio::test]
async fn me_requires_a_bearer_token() {
    let (status, body) = send(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        Method::GET,
        "/api/auth/me",
        Some("Bearer not-a-jwt".into()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_echoes_token_identity() {
    let id = Uuid::new_v4();
    let (status, body) = send(
        Method::GET,
        "/api/auth/me",
        Some(bearer(Role::Consultant, id)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "consultant");
    assert_eq!(body["data"]["id"], id.to_string());
}

#[tokio::test]
async fn superadmin_routes_reject_other_roles() {
    let client = bearer(Role::Client, Uuid::new_v4());
    let consultant = bearer(Role::Consultant, Uuid::new_v4());

    let uri = format!("/api/consultants/{}", Uuid::new_v4());
    let (status, _) = send(Method::DELETE, &uri, Some(client.clone()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(Method::GET, "/api/users", Some(consultant.clone()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        Method::POST,
        "/api/admin/appointments/expire",
        Some(consultant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        Method::POST,
        "/api/categories",
        Some(client),
        Some(json!({ "name": "Tax" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_validates_before_touching_storage() {
    for (overrides, field) in [
        (json!({ "client_name": null }), "client_name"),
        (json!({ "client_email": "not-an-email" }), "client_email"),
        (json!({ "client_email": "a@b..com" }), "client_email"),
        (json!({ "client_email": "   " }), "client_email is required"),
        (json!({ "client_phone": "  " }), "client_phone"),
        (json!({ "slot_id": null }), "slot_id"),
    ] {
        let (status, body) =
            send(Method::POST, "/api/appointments", None, Some(booking(overrides))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
        assert!(
            body["error"].as_str().unwrap_or_default().contains(field),
            "error for {field}: {body}"
        );
    }

    for price in [0, -100] {
        let (status, _) = send(
            Method::POST,
            "/api/appointments",
            None,
            Some(booking(json!({ "price": price }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}");
    }
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let mut missing_price = booking(json!({}));
    if let Some(fields) = missing_price.as_object_mut() {
        fields.remove("price");
    }

    for body in [missing_price, booking(json!({ "price": 499.5 }))] {
        let (status, body) = send(Method::POST, "/api/appointments", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap_or_default().contains("price"), "{body}");
    }

    let response = build_router(offline_state())
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
}

#[tokio::test]
async fn registration_checks_email_and_password() {
    let (status, body) = send(
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ravi", "email": "ravi@@example.com", "password": "longenough" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("email"), "{body}");

    let (status, body) = send(
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ravi", "email": "ravi@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"].as_str().unwrap_or_default().contains("password must be at least 8"),
        "{body}"
    );
}

#[tokio::test]
async fn guest_booking_rejects_malformed_credentials() {
    let (status, _) = send(
        Method::POST,
        "/api/appointments",
        Some("Token abc".into()),
        Some(booking(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn drafts_and_blog_writes_are_guarded() {
    let (status, _) = send(Method::GET, "/api/blogs?include_drafts=true", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        Method::GET,
        "/api/blogs?include_drafts=true",
        Some(bearer(Role::Client, Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        Method::PUT,
        "/api/blogs/my-first-post",
        Some(bearer(Role::Superadmin, Uuid::new_v4())),
        Some(json!({ "title": "New" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_get_error_body() {
    let (status, body) = send(Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("/api/nope"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = build_router(offline_state())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
