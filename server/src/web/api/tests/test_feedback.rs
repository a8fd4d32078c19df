use super::init_test_app;
use super::sample_data::{self, USER_ID};
use crate::data_store::store_mock::StoreMock;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;
use std::sync::Arc;

#[actix_web::test]
async fn test_list_feedback_is_public() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::get().uri("/api/feedback").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Uta User");
}

#[actix_web::test]
async fn test_create_feedback() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .cookie(sample_data::session_cookie_for(USER_ID))
        .set_json(json!({"comment": "Could use dark mode", "rating": 4}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    // the author's name is taken from the account, not the payload
    assert_eq!(body["name"], "Uta User");
    assert_eq!(body["rating"], 4);

    let data = store.data.lock().unwrap();
    assert_eq!(data.feedback.len(), 2);
}

#[actix_web::test]
async fn test_create_feedback_requires_authentication() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({"comment": "Anonymous rant", "rating": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_feedback_requires_comment() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .cookie(sample_data::session_cookie_for(USER_ID))
        .set_json(json!({"comment": "  ", "rating": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
