//! User-management tests: listing, deletion, and the self-deletion guard.

use axum::http::{Method, StatusCode};

use super::common::*;

async fn own_id(app: &axum::Router, cookie: &str) -> String {
    let (status, body) = send(app, request(Method::GET, "/auth/me", Some(cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn admin_lists_users_without_password_material() {
    let app = test_app().await;
    register(&app, "sales1@x.com", "Sales One", None).await;
    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;

    let (status, body) = send(&app, request(Method::GET, "/users", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    let sales = users
        .iter()
        .find(|u| u["email"] == "sales1@x.com")
        .unwrap();
    assert_eq!(sales["full_name"], "Sales One");
    assert_eq!(sales["role"], "sales");
    assert!(sales.get("password_hash").is_none());
}

#[tokio::test]
async fn listing_requires_admin() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;

    let (status, _) = send(&app, request(Method::GET, "/users", Some(&sales), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, request(Method::GET, "/users", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_deletes_another_user() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    let sales_id = own_id(&app, &sales).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let uri = format!("/users/{}", sales_id);

    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    // A second attempt finds nothing.
    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn self_deletion_is_forbidden() {
    let app = test_app().await;
    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let admin_id = own_id(&app, &admin).await;

    let (status, body) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/users/{}", admin_id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Cannot delete your own account");
}

#[tokio::test]
async fn delete_missing_and_malformed_ids() {
    let app = test_app().await;
    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            "/users/00000000-0000-0000-0000-000000000001",
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/users/not-a-uuid", Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deletion_requires_admin() {
    let app = test_app().await;
    let sales1 = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    let sales2 = register_and_login(&app, "sales2@x.com", "Sales Two", None).await;
    let target = own_id(&app, &sales2).await;

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/users/{}", target),
            Some(&sales1),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
