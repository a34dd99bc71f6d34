//! Tests for users API handlers.

use super::*;
use crate::domain::ports::{InMemoryUserStore, MockUserRegistry, UserRegistry};
use crate::domain::{ErrorCode, RegistrationService};
use crate::inbound::http::error::json_error_handler;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

fn test_app(
    registry: Arc<dyn UserRegistry>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(registry)))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(web::scope("/api").configure(configure))
}

#[fixture]
fn registry() -> Arc<dyn UserRegistry> {
    let store = Arc::new(InMemoryUserStore::new(Arc::new(DefaultClock)));
    Arc::new(RegistrationService::new(store))
}

async fn send(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = serde_json::from_slice(&body).expect("JSON body");
    (status, value)
}

fn create(body: Value) -> actix_test::TestRequest {
    actix_test::TestRequest::post().uri("/api/users").set_json(body)
}

#[rstest]
#[actix_web::test]
async fn create_then_get_returns_identical_fields(registry: Arc<dyn UserRegistry>) {
    let app = actix_test::init_service(test_app(registry)).await;

    let (status, created) = send(
        &app,
        create(json!({ "username": "testuser_1", "email": "test_1@example.com", "age": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], USER_CREATED);
    assert_eq!(created["user"]["age"], 25);

    let id = created["user"]["id"].as_i64().expect("numeric id");
    let (status, fetched) = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/users/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["user"], created["user"]);
}

#[rstest]
#[case(json!({ "email": "a@example.com", "age": 30 }), "Username, email, and age are required")]
#[case(json!({ "username": "a", "age": 30 }), "Username, email, and age are required")]
#[case(json!({ "username": "a", "email": "a@example.com" }), "Username, email, and age are required")]
#[case(json!({ "username": "a", "email": "a@example.com", "age": 0 }), "Age must be between 1 and 150")]
#[case(json!({ "username": "a", "email": "a@example.com", "age": 151 }), "Age must be between 1 and 150")]
#[actix_web::test]
async fn create_rejects_invalid_bodies(
    registry: Arc<dyn UserRegistry>,
    #[case] body: Value,
    #[case] message: &str,
) {
    let app = actix_test::init_service(test_app(registry)).await;

    let (status, value) = send(&app, create(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["success"], false);
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["message"], message);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_error_envelope(registry: Arc<dyn UserRegistry>) {
    let app = actix_test::init_service(test_app(registry)).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");

    let (status, value) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["success"], false);
    assert_eq!(value["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn duplicate_username_is_conflict_and_original_kept(registry: Arc<dyn UserRegistry>) {
    let app = actix_test::init_service(test_app(registry)).await;
    send(
        &app,
        create(json!({ "username": "dup", "email": "first@example.com", "age": 30 })),
    )
    .await;

    let (status, value) = send(
        &app,
        create(json!({ "username": "dup", "email": "second@example.com", "age": 31 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(value["message"], "Username or email already exists");

    let (_, fetched) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/users/username/dup"),
    )
    .await;
    assert_eq!(fetched["user"]["email"], "first@example.com");
}

#[rstest]
#[case("/api/users/999")]
#[case("/api/users/not-a-number")]
#[case("/api/users/username/nobody")]
#[actix_web::test]
async fn lookups_of_absent_users_are_not_found(
    registry: Arc<dyn UserRegistry>,
    #[case] uri: &str,
) {
    let app = actix_test::init_service(test_app(registry)).await;

    let (status, value) = send(&app, actix_test::TestRequest::get().uri(uri)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value["success"], false);
    assert_eq!(value["message"], "User not found");
}

#[rstest]
#[actix_web::test]
async fn delete_is_idempotent(registry: Arc<dyn UserRegistry>) {
    let app = actix_test::init_service(test_app(registry)).await;
    let (_, created) = send(
        &app,
        create(json!({ "username": "gone", "email": "gone@example.com", "age": 40 })),
    )
    .await;
    let uri = format!("/api/users/{}", created["user"]["id"]);

    for _ in 0..2 {
        let (status, value) = send(&app, actix_test::TestRequest::delete().uri(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "success": true, "message": USER_DELETED }));
    }

    let (status, _) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn list_and_delete_all(registry: Arc<dyn UserRegistry>) {
    let app = actix_test::init_service(test_app(registry)).await;
    for name in ["first", "second"] {
        send(
            &app,
            create(json!({ "username": name, "email": format!("{name}@example.com"), "age": 20 })),
        )
        .await;
    }

    let (status, listed) = send(&app, actix_test::TestRequest::get().uri("/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["users"].as_array().map(Vec::len), Some(2));

    let (status, value) = send(&app, actix_test::TestRequest::delete().uri("/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["message"], ALL_USERS_DELETED);

    let (_, listed) = send(&app, actix_test::TestRequest::get().uri("/api/users")).await;
    assert_eq!(listed, json!({ "success": true, "users": [] }));
}

#[rstest]
#[actix_web::test]
async fn store_outage_maps_to_service_unavailable() {
    let mut registry = MockUserRegistry::new();
    registry
        .expect_list_users()
        .return_once(|| Err(Error::service_unavailable("user store unavailable: locked")));
    let app = actix_test::init_service(test_app(Arc::new(registry))).await;

    let (status, value) = send(&app, actix_test::TestRequest::get().uri("/api/users")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(value["code"], serde_json::to_value(ErrorCode::ServiceUnavailable).expect("code"));
}
