use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use loan_tracker::api;
use loan_tracker::db;
use loan_tracker::domain::FixedClock;
use loan_tracker::infrastructure::AppState;
use loan_tracker::models::{borrowing_transaction, customer};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Statement};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// Helper to create an in-memory database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Router over `db` whose clock is pinned to `today`
fn app_on(db: &DatabaseConnection, today: &str) -> (AppState, Router) {
    let state = AppState::with_clock(db.clone(), Arc::new(FixedClock(date(today))));
    (state.clone(), api::api_router(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_customer(app: &Router, first: &str, last: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/customers/",
        Some(json!({ "first_name": first, "last_name": last, "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["customer"]["id"].as_i64().unwrap()
}

async fn create_item(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/items/", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["item"]["id"].as_i64().unwrap()
}

async fn create_loan(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, "POST", "/transactions/", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["transaction"].clone()
}

fn ids(list: &Value) -> Vec<i64> {
    list["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_loan_due_today_is_borrowed() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-15");
    let customer = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let item = create_item(&app, "Drill").await;

    let loan = create_loan(
        &app,
        json!({
            "item": item,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15"
        }),
    )
    .await;

    assert_eq!(loan["status"], "borrowed");
    assert_eq!(loan["is_overdue"], false);
    assert_eq!(loan["borrower_name"], "Ada");
    assert_eq!(loan["item_name"], "Drill");
    assert_eq!(loan["date_returned"], Value::Null);
    assert!(loan["created_at"].is_string());
}

#[tokio::test]
async fn test_loan_day_after_due_is_overdue() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-16");
    let customer = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let item = create_item(&app, "Drill").await;

    let loan = create_loan(
        &app,
        json!({
            "item": item,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15"
        }),
    )
    .await;
    assert_eq!(loan["status"], "overdue");
    assert_eq!(loan["is_overdue"], true);

    let (_, overdue) = send(&app, "GET", "/transactions/overdue/", None).await;
    assert_eq!(ids(&overdue), vec![loan["id"].as_i64().unwrap()]);

    let (_, active) = send(&app, "GET", "/transactions/active/", None).await;
    assert_eq!(active["total"], 0);
}

#[tokio::test]
async fn test_return_date_wins_over_overdue() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-02-01");
    let customer = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let item = create_item(&app, "Drill").await;

    let loan = create_loan(
        &app,
        json!({
            "item": item,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15",
            "date_returned": "2024-01-10"
        }),
    )
    .await;

    assert_eq!(loan["status"], "returned");
    assert_eq!(loan["is_overdue"], false);
    assert_eq!(loan["date_returned"], "2024-01-10");
}

#[tokio::test]
async fn test_client_supplied_status_and_id_are_ignored() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-05");
    let customer = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let item = create_item(&app, "Drill").await;

    let loan = create_loan(
        &app,
        json!({
            "id": 4242,
            "item": item,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15",
            "status": "returned",
            "created_at": "1999-01-01T00:00:00Z"
        }),
    )
    .await;

    assert_ne!(loan["id"], 4242);
    assert_eq!(loan["status"], "borrowed");
    assert_ne!(loan["created_at"], "1999-01-01T00:00:00Z");

    let id = loan["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/transactions/{id}/"),
        Some(json!({ "status": "overdue" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "borrowed");
}

#[tokio::test]
async fn test_stored_status_goes_stale_until_next_write() {
    let db = setup_test_db().await;

    // Written while still on time
    let (_, before) = app_on(&db, "2024-01-10");
    let customer = create_customer(&before, "Ada", "Lovelace", "ada@example.com").await;
    let item = create_item(&before, "Drill").await;
    let loan = create_loan(
        &before,
        json!({
            "item": item,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15"
        }),
    )
    .await;
    let id = loan["id"].as_i64().unwrap();

    // Read after the due date: stored status is stale, live check is not
    let (_, after) = app_on(&db, "2024-01-20");
    let (_, body) = send(&after, "GET", &format!("/transactions/{id}/"), None).await;
    assert_eq!(body["transaction"]["status"], "borrowed");
    assert_eq!(body["transaction"]["is_overdue"], true);

    let (_, active) = send(&after, "GET", "/transactions/active/", None).await;
    assert_eq!(ids(&active), vec![id]);
    let (_, overdue) = send(&after, "GET", "/transactions/overdue/", None).await;
    assert_eq!(overdue["total"], 0);

    // Any write re-stamps, even one that changes nothing
    let (status, body) = send(&after, "PATCH", &format!("/transactions/{id}/"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "overdue");

    let (_, overdue) = send(&after, "GET", "/transactions/overdue/", None).await;
    assert_eq!(ids(&overdue), vec![id]);
    let (_, active) = send(&after, "GET", "/transactions/active/", None).await;
    assert_eq!(active["total"], 0);
}

#[tokio::test]
async fn test_returning_a_loan_is_terminal() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-20");
    let customer = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let item = create_item(&app, "Drill").await;
    let loan = create_loan(
        &app,
        json!({
            "item": item,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15"
        }),
    )
    .await;
    assert_eq!(loan["status"], "overdue");
    let uri = format!("/transactions/{}/", loan["id"]);

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "date_returned": "2024-01-19" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "returned");

    // Much later, a write that leaves the return date alone keeps it returned
    let (_, later) = app_on(&db, "2030-01-01");
    let (status, body) = send(&later, "PATCH", &uri, Some(json!({ "due_date": "2024-01-16" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "returned");
    assert_eq!(body["transaction"]["is_overdue"], false);

    // Clearing or moving the return date is refused
    let (status, _) = send(&later, "PATCH", &uri, Some(json!({ "date_returned": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&later, "PATCH", &uri, Some(json!({ "date_returned": "2024-01-18" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&later, "GET", &uri, None).await;
    assert_eq!(body["transaction"]["date_returned"], "2024-01-19");
}

#[tokio::test]
async fn test_put_replaces_loan_and_restamps() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-20");
    let customer = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let drill = create_item(&app, "Drill").await;
    let tent = create_item(&app, "Tent").await;
    let loan = create_loan(
        &app,
        json!({
            "item": drill,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15"
        }),
    )
    .await;
    assert_eq!(loan["status"], "overdue");
    let uri = format!("/transactions/{}/", loan["id"]);

    // PUT without every required field is rejected
    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "due_date": "2024-02-01" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({
            "item": tent,
            "borrower": customer,
            "date_issued": "2024-01-01",
            "due_date": "2024-02-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "borrowed");
    assert_eq!(body["transaction"]["item"], tent);
    assert_eq!(body["transaction"]["item_name"], "Tent");
    assert_eq!(body["transaction"]["created_at"], loan["created_at"]);
}

#[tokio::test]
async fn test_deleting_customer_removes_their_loans() {
    let db = setup_test_db().await;
    let (state, app) = app_on(&db, "2024-01-05");
    let ada = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let alan = create_customer(&app, "Alan", "Turing", "alan@example.com").await;
    let drill = create_item(&app, "Drill").await;
    let tent = create_item(&app, "Tent").await;

    let mut ada_loans = Vec::new();
    for item in [drill, tent] {
        let loan = create_loan(
            &app,
            json!({
                "item": item,
                "borrower": ada,
                "date_issued": "2024-01-01",
                "due_date": "2024-01-15"
            }),
        )
        .await;
        ada_loans.push(loan["id"].as_i64().unwrap());
    }
    let alan_loan = create_loan(
        &app,
        json!({
            "item": drill,
            "borrower": alan,
            "date_issued": "2024-01-02",
            "due_date": "2024-01-16"
        }),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/customers/{ada}/"), None).await;
    assert_eq!(status, StatusCode::OK);

    for id in ada_loans {
        let (status, _) = send(&app, "GET", &format!("/transactions/{id}/"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, remaining) = send(&app, "GET", "/transactions/", None).await;
    assert_eq!(ids(&remaining), vec![alan_loan["id"].as_i64().unwrap()]);

    let stored = borrowing_transaction::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_deleting_item_removes_its_loans() {
    let db = setup_test_db().await;
    let (state, app) = app_on(&db, "2024-01-05");
    let ada = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let drill = create_item(&app, "Drill").await;
    create_loan(
        &app,
        json!({
            "item": drill,
            "borrower": ada,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-15"
        }),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/items/{drill}/"), None).await;
    assert_eq!(status, StatusCode::OK);

    let stored = borrowing_transaction::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(stored, 0);

    // The borrower is untouched
    let (status, _) = send(&app, "GET", &format!("/customers/{ada}/"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_email_persists_nothing() {
    let db = setup_test_db().await;
    let (state, app) = app_on(&db, "2024-01-05");
    create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/customers/",
        Some(json!({
            "first_name": "Augusta",
            "last_name": "King",
            "email": "ada@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let stored = customer::Entity::find().count(state.db()).await.unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_customer_email_change_checks_uniqueness() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-05");
    create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let alan = create_customer(&app, "Alan", "Turing", "alan@example.com").await;
    let uri = format!("/customers/{alan}/");

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "email": "ada@example.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Re-sending your own email is fine
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({
            "first_name": "Alan",
            "last_name": "Turing",
            "email": "alan@example.com",
            "phone_number": "555-0199"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["phone_number"], "555-0199");

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "phone_number": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["phone_number"], Value::Null);
    assert_eq!(body["customer"]["email"], "alan@example.com");
}

#[tokio::test]
async fn test_transaction_filters_and_search() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-20");
    let ada = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let alan = create_customer(&app, "Alan", "Turing", "alan@example.com").await;
    let drill = create_item(&app, "Cordless drill").await;
    let tent = create_item(&app, "Camping tent").await;

    let late = create_loan(
        &app,
        json!({ "item": drill, "borrower": ada, "date_issued": "2024-01-01", "due_date": "2024-01-15" }),
    )
    .await["id"]
        .as_i64()
        .unwrap();
    let on_time = create_loan(
        &app,
        json!({ "item": tent, "borrower": alan, "date_issued": "2024-01-18", "due_date": "2024-02-01" }),
    )
    .await["id"]
        .as_i64()
        .unwrap();
    let back = create_loan(
        &app,
        json!({
            "item": tent,
            "borrower": ada,
            "date_issued": "2024-01-01",
            "due_date": "2024-01-10",
            "date_returned": "2024-01-09"
        }),
    )
    .await["id"]
        .as_i64()
        .unwrap();

    let (_, body) = send(&app, "GET", "/transactions/?status=overdue", None).await;
    assert_eq!(ids(&body), vec![late]);
    let (_, body) = send(&app, "GET", "/transactions/?status=returned", None).await;
    assert_eq!(ids(&body), vec![back]);
    let (_, body) = send(&app, "GET", &format!("/transactions/?borrower={ada}"), None).await;
    assert_eq!(ids(&body), vec![late, back]);
    let (_, body) = send(&app, "GET", &format!("/transactions/?item={tent}"), None).await;
    assert_eq!(ids(&body), vec![on_time, back]);
    let (_, body) = send(
        &app,
        "GET",
        &format!("/transactions/?item={tent}&borrower={alan}"),
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![on_time]);

    // Search covers borrower first/last name and item name, case-insensitively
    let (_, body) = send(&app, "GET", "/transactions/?search=turing", None).await;
    assert_eq!(ids(&body), vec![on_time]);
    let (_, body) = send(&app, "GET", "/transactions/?search=DRILL", None).await;
    assert_eq!(ids(&body), vec![late]);
    let (_, body) = send(&app, "GET", "/transactions/?search=ada%20tent", None).await;
    assert_eq!(ids(&body), vec![back]);
    let (_, body) = send(&app, "GET", "/transactions/?search=nobody", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_customer_and_item_search() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-05");
    create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let alan = create_customer(&app, "Alan", "Turing", "alan@bletchley.example").await;
    create_item(&app, "Drill").await;
    let (_, body) = send(
        &app,
        "POST",
        "/items/",
        Some(json!({ "name": "Tent", "description": "Sleeps four" })),
    )
    .await;
    let tent = body["item"]["id"].as_i64().unwrap();

    let (_, body) = send(&app, "GET", "/customers/?search=bletchley", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["customers"][0]["id"], alan);

    let (_, body) = send(&app, "GET", "/customers/", None).await;
    assert_eq!(body["total"], 2);

    let (_, body) = send(&app, "GET", "/items/?search=sleeps", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], tent);
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-05");
    create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    create_customer(&app, "Alan", "Turing", "alan@bletchley.example").await;
    create_item(&app, "Tent").await;
    let sale = create_item(&app, "Rack 50% off").await;

    for query in ["%25", "_", "%5C"] {
        let (status, body) = send(&app, "GET", &format!("/customers/?search={query}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0, "{query}");
    }

    let (_, body) = send(&app, "GET", "/items/?search=%25", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], sale);

    let (_, body) = send(&app, "GET", "/transactions/?search=_", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_views_handle_many_loans_for_one_borrower() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-05");
    let ada = create_customer(&app, "Ada", "Lovelace", "ada@example.com").await;
    let tent = create_item(&app, "Tent").await;
    let first = create_loan(
        &app,
        json!({
            "item": tent,
            "borrower": ada,
            "date_issued": "2024-01-01",
            "due_date": "2024-02-01"
        }),
    )
    .await["id"]
        .as_i64()
        .unwrap();

    // More rows than SQLite allows bound variables in one statement
    db.execute(Statement::from_string(
        db.get_database_backend(),
        format!(
            "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 32999) \
             INSERT INTO borrowing_transactions \
             (item_id, borrower_id, date_issued, due_date, date_returned, status, created_at) \
             SELECT t.item_id, t.borrower_id, t.date_issued, t.due_date, t.date_returned, \
             t.status, t.created_at FROM borrowing_transactions t, n WHERE t.id = {first}"
        ),
    ))
    .await
    .unwrap();

    for uri in ["/transactions/", "/transactions/active/"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["total"], 33_000, "{uri}");
        assert_eq!(body["transactions"][32_999]["borrower_name"], "Ada");
        assert_eq!(body["transactions"][32_999]["item_name"], "Tent");
    }
}

#[tokio::test]
async fn test_item_update_keeps_created_at() {
    let db = setup_test_db().await;
    let (_, app) = app_on(&db, "2024-01-05");
    let (_, created) = send(
        &app,
        "POST",
        "/items/",
        Some(json!({ "name": "Tent", "description": "Sleeps four" })),
    )
    .await;
    let uri = format!("/items/{}/", created["item"]["id"]);

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "name": "Big tent" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["name"], "Big tent");
    assert_eq!(body["item"]["description"], "Sleeps four");
    assert_eq!(body["item"]["created_at"], created["item"]["created_at"]);

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "description": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
