//! Admin invoice surface tests: cross-owner visibility, status updates, and
//! restricted-field edits.

use axum::http::{Method, StatusCode};
use serde_json::json;
use std::time::Duration;

use super::common::*;

#[tokio::test]
async fn admin_sees_everyone_with_owner_info() {
    let app = test_app().await;

    let sales1 = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    create_invoice(&app, &sales1, "Acme", 100.0).await;
    tokio::time::sleep(Duration::from_millis(2)).await;

    let sales2 = register_and_login(&app, "sales2@x.com", "Sales Two", None).await;
    create_invoice(&app, &sales2, "Globex", 200.0).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let (status, body) = send(&app, request(Method::GET, "/invoices/all", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Newest first.
    assert_eq!(list[0]["customer_name"], "Globex");
    assert_eq!(list[0]["owner_info"]["full_name"], "Sales Two");
    assert_eq!(list[0]["owner_info"]["email"], "sales2@x.com");
    assert_eq!(list[1]["customer_name"], "Acme");
    assert_eq!(list[1]["owner_info"]["full_name"], "Sales One");
}

#[tokio::test]
async fn admin_reads_any_invoice() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    let id = create_invoice(&app, &sales, "Acme", 100.0).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let (status, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/admin/invoices/{}", id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer_name"], "Acme");
}

#[tokio::test]
async fn status_update_validates_then_persists() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    let id = create_invoice(&app, &sales, "Acme", 100.0).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let status_uri = format!("/invoices/{}/status", id);

    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &status_uri,
            Some(&admin),
            Some(json!({"status": "paid"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");

    // Unknown value is rejected with the allowed set, nothing changes.
    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &status_uri,
            Some(&admin),
            Some(json!({"status": "bogus"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid status value"));

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/admin/invoices/{}", id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");
}

#[tokio::test]
async fn admin_edits_any_invoice_within_the_allowed_fields() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    let id = create_invoice(&app, &sales, "Acme", 100.0).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let uri = format!("/admin/invoices/{}", id);

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &uri,
            Some(&admin),
            Some(json!({"customer_name": "Acme Corp", "amount": 150.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer_name"], "Acme Corp");
    assert_eq!(body["amount"], 150.0);
    // Untouched fields survive.
    assert_eq!(body["description"], "consulting");

    // Reassigning ownership is not in the permitted field set.
    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            &uri,
            Some(&admin),
            Some(json!({"owner": "00000000-0000-0000-0000-000000000000"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_deletes_any_invoice() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    let id = create_invoice(&app, &sales, "Acme", 100.0).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;
    let uri = format!("/admin/invoices/{}", id);

    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Invoice deleted successfully");

    let (status, _) = send(&app, request(Method::GET, &uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_info_is_null_after_owner_deletion() {
    let app = test_app().await;
    let sales = register_and_login(&app, "sales1@x.com", "Sales One", None).await;
    create_invoice(&app, &sales, "Acme", 100.0).await;

    let admin = register_and_login(&app, "admin@x.com", "The Admin", Some("admin")).await;

    // Find the sales user's id via the user listing, then delete them.
    let (_, users) = send(&app, request(Method::GET, "/users", Some(&admin), None)).await;
    let sales_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "sales1@x.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/users/{}", sales_id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The invoice remains, with no owner identity attached.
    let (status, body) = send(&app, request(Method::GET, "/invoices/all", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0]["owner_info"].is_null());
}
