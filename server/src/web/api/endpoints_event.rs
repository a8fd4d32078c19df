use crate::data_store::auth_token::Privilege;
use crate::data_store::{models, EventFilter, StoreError};
use crate::web::api::{session_token_from_request, APIError};
use crate::web::AppState;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Deserialize)]
struct EventListQuery {
    /// "upcoming" or "past"; everything else is rejected, no value means all events.
    #[serde(rename = "type")]
    list_type: Option<String>,
}

impl TryFrom<EventListQuery> for EventFilter {
    type Error = APIError;

    fn try_from(query: EventListQuery) -> Result<Self, Self::Error> {
        match query.list_type.as_deref() {
            None => Ok(EventFilter::default()),
            Some("upcoming") => Ok(EventFilter::upcoming(chrono::Utc::now())),
            Some("past") => Ok(EventFilter::past(chrono::Utc::now())),
            Some(other) => Err(APIError::InvalidData(format!(
                "Unknown event list type '{}'",
                other
            ))),
        }
    }
}

#[get("/events")]
async fn list_events(
    query: web::Query<EventListQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let filter: EventFilter = query.into_inner().try_into()?;
    let events: Vec<eventflow_api_types::Event> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_events(filter)?)
    })
    .await??
    .into_iter()
    .map(|e| e.into())
    .collect();

    Ok(web::Json(events))
}

#[get("/events/{event_id}")]
async fn get_event(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let event: eventflow_api_types::Event = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_event(event_id)?)
    })
    .await??
    .into();

    Ok(web::Json(event))
}

#[post("/events")]
async fn create_event(
    data: web::Json<eventflow_api_types::NewEventData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    if data.name.trim().is_empty() || data.location.trim().is_empty() {
        return Err(APIError::InvalidData(
            "Event name and location are required".to_string(),
        ));
    }
    let event: eventflow_api_types::Event = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        // authorization must precede the owner email lookup
        auth.check_privilege(Privilege::CreateEvents)?;
        // An explicit owner email takes precedence over an owner id; without either the
        // calling admin becomes the organizer.
        let organizer = match &data.owner_email {
            Some(email) => match store.get_user_by_email(email) {
                Ok(user) => user.id,
                Err(StoreError::NotExisting) => return Err(APIError::NotExisting),
                Err(e) => return Err(e.into()),
            },
            None => data.owner_id.unwrap_or_else(|| auth.user_id()),
        };
        Ok(store.create_event(
            &auth,
            models::NewEvent {
                id: Uuid::new_v4(),
                name: data.name,
                date: data.date,
                location: data.location,
                description: data.description,
                organizer,
            },
        )?)
    })
    .await??
    .into();

    Ok(HttpResponse::Created().json(event))
}

#[put("/events/{event_id}")]
async fn update_event(
    path: web::Path<Uuid>,
    data: web::Json<eventflow_api_types::EventPatchData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    let event: eventflow_api_types::Event = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.update_event(
            &auth,
            event_id,
            models::EventPatch {
                name: data.name,
                date: data.date,
                location: data.location,
                description: data.description,
            },
        )?)
    })
    .await??
    .into();

    Ok(web::Json(event))
}

#[delete("/events/{event_id}")]
async fn delete_event(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        store.delete_event(&auth, event_id)?;
        Ok(())
    })
    .await??;

    Ok(HttpResponse::Ok().json(json!({"message": "Event deleted successfully"})))
}
