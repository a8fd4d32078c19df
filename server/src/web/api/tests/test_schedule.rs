use super::init_test_app;
use super::sample_data::{self, EVENT_ID, ORGANIZER_ID, USER_ID};
use crate::data_store::store_mock::StoreMock;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;
use std::sync::Arc;

#[actix_web::test]
async fn test_get_schedule_is_public_and_sorted() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/schedules/events/{}", EVENT_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["time"], "18:00");
    assert_eq!(items[1]["time"], "20:00");
}

#[actix_web::test]
async fn test_get_schedule_for_unknown_event() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/schedules/events/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_schedule_item_as_organizer() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules")
        .cookie(sample_data::session_cookie_for(ORGANIZER_ID))
        .set_json(json!({
            "event_id": EVENT_ID,
            "time": "22:00",
            "activity": "Campfire",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let data = store.data.lock().unwrap();
    assert_eq!(
        data.schedules
            .iter()
            .filter(|s| s.event_id == EVENT_ID)
            .count(),
        3
    );
}

#[actix_web::test]
async fn test_create_schedule_item_requires_ownership() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules")
        .cookie(sample_data::session_cookie_for(USER_ID))
        .set_json(json!({
            "event_id": EVENT_ID,
            "time": "22:00",
            "activity": "Campfire",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_create_schedule_item_validates_fields() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules")
        .cookie(sample_data::session_cookie_for(ORGANIZER_ID))
        .set_json(json!({
            "event_id": EVENT_ID,
            "time": "22:00",
            "activity": "",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
