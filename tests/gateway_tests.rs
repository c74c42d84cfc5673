//! HTTP-level tests of the API gateway: bearer injection, 401 handling and
//! error body classification.

use finance_tests::*;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use shared::config::ClientConfig;
use shared::models::category::CategoryPercentageUpdate;
use shared::models::salary::SalaryPayload;
use shared::repositories::api_client::HttpApiClient;
use shared::repositories::category_repository::CategoryRepository;
use shared::repositories::errors::api_client_errors::ApiClientError;
use shared::repositories::expense_repository::ExpenseRepository;
use shared::repositories::salary_repository::SalaryRepository;
use shared::repositories::storage::{MemoryStorage, TokenStore};
use shared::services::navigation::Route;

#[tokio::test]
async fn test_bearer_token_read_from_storage_on_each_request() {
    let app = TestApp::start().await;
    let first = valid_token(11);
    let second = valid_token(20);

    Mock::given(method("GET"))
        .and(path(TestApp::api("/expenses")))
        .and(header("authorization", format!("Bearer {}", first).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(TestApp::api("/expenses")))
        .and(header("authorization", format!("Bearer {}", second).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.server)
        .await;

    app.persist_token(&first);
    app.client.list_expenses().await.unwrap();
    app.persist_token(&second);
    app.client.list_expenses().await.unwrap();
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path(TestApp::api("/salaries")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.server)
        .await;

    app.client.list_salaries().await.unwrap();

    let requests = app.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_backend_shapes_are_accepted() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path(TestApp::api("/expenses")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 7,
                "categoryId": 3,
                "value": 42.5,
                "date": "2025-01-15T00:00:00",
                "paymentMethod": "CREDIT",
                "card": "Nubank",
                "installments": 2,
                "isPaid": true,
                "description": "Groceries"
            }
        ])))
        .mount(&app.server)
        .await;

    let expenses = app.client.list_expenses().await.unwrap();

    assert_eq!(expenses.len(), 1);
    let expense = &expenses[0];
    assert_eq!(expense.id, "7");
    assert_eq!(expense.category_id, "3");
    assert_eq!(expense.value, Decimal::new(425, 1));
    assert_eq!(expense.date.to_string(), "2025-01-15");
    assert!(expense.paid);
}

#[tokio::test]
async fn test_salary_posted_with_date_only() {
    let app = TestApp::start().await;
    Mock::given(method("POST"))
        .and(path(TestApp::api("/salaries")))
        .and(body_json(json!({ "value": 3000.0, "date": "2025-02-01" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "value": 3000, "date": "2025-02-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let payload = SalaryPayload {
        value: Decimal::from(3000),
        date: chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
    };
    let salary = app.client.upsert_salary(&payload).await.unwrap();
    assert_eq!(salary.id, "1");
    assert_eq!(salary.value, Decimal::from(3000));
}

#[tokio::test]
async fn test_unauthorized_forces_logout() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path(TestApp::api("/profile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(None, 1)))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(TestApp::api("/categories")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.server)
        .await;

    app.persist_token(&valid_token(11));
    app.session.initialize().await;
    assert!(app.session.is_authenticated());

    let result = app.client.list_categories().await;

    assert_eq!(result.unwrap_err(), ApiClientError::Unauthorized);
    assert!(!app.session.is_authenticated());
    assert_eq!(app.stored_token(), None);
    assert_eq!(app.navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_validation_body_is_structured() {
    let app = TestApp::start().await;
    Mock::given(method("POST"))
        .and(path(TestApp::api("/categories/batch-update-percentages")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "type": "https://tools.ietf.org/html/rfc9110#section-15.5.1",
            "title": "One or more validation errors occurred.",
            "status": 400,
            "errors": {
                "Updates[0].IdealPercentage": ["The total must not exceed 100."]
            }
        })))
        .mount(&app.server)
        .await;

    let updates = vec![CategoryPercentageUpdate {
        category_id: "1".to_string(),
        ideal_percentage: Decimal::from(130),
    }];
    let err = app
        .client
        .batch_update_percentages(&updates)
        .await
        .unwrap_err();

    match &err {
        ApiClientError::Validation { message, errors } => {
            assert_eq!(message, "One or more validation errors occurred.");
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(err.first_field_message(), Some("The total must not exceed 100."));
}

#[tokio::test]
async fn test_plain_message_and_empty_bodies() {
    let app = TestApp::start().await;
    Mock::given(method("DELETE"))
        .and(path(TestApp::api("/categories/1")))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Category in use" })),
        )
        .mount(&app.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(TestApp::api("/categories/2")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.server)
        .await;

    assert_eq!(
        app.client.delete_category("1").await.unwrap_err(),
        ApiClientError::Status {
            status: 409,
            message: "Category in use".to_string()
        }
    );
    assert_eq!(
        app.client.delete_category("2").await.unwrap_err(),
        ApiClientError::Status {
            status: 500,
            message: "Request failed with status 500".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = ClientConfig::default().with_api_base_url("http://127.0.0.1:1/api");
    let token_store = TokenStore::new(Arc::new(MemoryStorage::new()));
    let client = HttpApiClient::new(&config, Arc::new(token_store)).unwrap();

    let err = client.list_expenses().await.unwrap_err();
    assert!(matches!(err, ApiClientError::Transport(_)));
}
