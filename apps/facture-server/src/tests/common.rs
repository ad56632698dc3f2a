//! Common test helpers: router construction, request plumbing, and
//! register/login shortcuts.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use facture_store_sqlite::SqliteStore;

use crate::config::ServerConfig;
use crate::server::{router, AppState};

/// Build a router over a fresh in-memory store.
pub async fn test_app() -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    router(AppState {
        store,
        config: ServerConfig::test(),
    })
}

pub fn request(
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return (status, parsed JSON body).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn register(app: &Router, email: &str, full_name: &str, role: Option<&str>) {
    let mut body = json!({
        "full_name": full_name,
        "email": email,
        "password": "pw123",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    let (status, _) = send(app, request(Method::POST, "/auth/register", None, Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
}

/// Log in and return the session cookie pair (`facture_sid=<token>`).
pub async fn login(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": email, "password": "pw123"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

pub async fn register_and_login(
    app: &Router,
    email: &str,
    full_name: &str,
    role: Option<&str>,
) -> String {
    register(app, email, full_name, role).await;
    login(app, email).await
}

/// Create an invoice as the cookie's user and return its id.
pub async fn create_invoice(app: &Router, cookie: &str, customer: &str, amount: f64) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/invoices",
            Some(cookie),
            Some(json!({
                "customer_name": customer,
                "customer_email": format!("{}@x.com", customer.to_lowercase()),
                "amount": amount,
                "description": "consulting",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}
