use crate::data_store::models;
use crate::web::api::{session_token_from_request, APIError};
use crate::web::AppState;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

#[post("/requests")]
async fn create_event_request(
    data: web::Json<eventflow_api_types::NewEventRequestData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    if data.name.trim().is_empty() || data.event_type.trim().is_empty() {
        return Err(APIError::InvalidData(
            "Event name and type are required".to_string(),
        ));
    }
    let event_request: eventflow_api_types::EventRequest =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let auth = store.get_auth_token_for_session(&session_token)?;
            Ok(store.create_event_request(
                &auth,
                models::NewEventRequest {
                    id: Uuid::new_v4(),
                    user_id: auth.user_id(),
                    name: data.name,
                    event_type: data.event_type,
                    date: data.date,
                    budget: data.budget,
                    requirements: data.requirements,
                    status: models::RequestStatus::Pending,
                },
            )?)
        })
        .await??
        .into();

    Ok(HttpResponse::Created().json(event_request))
}

#[get("/requests/my")]
async fn list_own_event_requests(
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let requests: Vec<eventflow_api_types::EventRequest> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let auth = store.get_auth_token_for_session(&session_token)?;
            Ok(store.get_own_event_requests(&auth)?)
        })
        .await??
        .into_iter()
        .map(|r| r.into())
        .collect();

    Ok(web::Json(requests))
}

#[get("/requests")]
async fn list_event_requests(
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let requests: Vec<eventflow_api_types::EventRequest> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let auth = store.get_auth_token_for_session(&session_token)?;
            Ok(store.list_event_requests(&auth)?)
        })
        .await??
        .into_iter()
        .map(|r| r.into())
        .collect();

    Ok(web::Json(requests))
}

#[post("/requests/{request_id}/approve")]
async fn approve_event_request(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let request_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    let (event_request, event) = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.approve_event_request(&auth, request_id)?)
    })
    .await??;
    let event_request: eventflow_api_types::EventRequest = event_request.into();
    let event: eventflow_api_types::Event = event.into();

    Ok(web::Json(json!({
        "request": event_request,
        "event": event,
    })))
}

#[post("/requests/{request_id}/reject")]
async fn reject_event_request(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let request_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    let event_request: eventflow_api_types::EventRequest =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let auth = store.get_auth_token_for_session(&session_token)?;
            Ok(store.reject_event_request(&auth, request_id)?)
        })
        .await??
        .into();

    Ok(web::Json(event_request))
}
