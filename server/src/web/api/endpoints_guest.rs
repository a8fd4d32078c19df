use crate::data_store::{models, RsvpUpdate};
use crate::setup::get_mail_credentials_from_env;
use crate::web::api::{session_token_from_request, APIError};
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use log::{debug, info};
use serde_json::json;
use uuid::Uuid;

#[post("/guests/invite")]
async fn invite_guest(
    data: web::Json<eventflow_api_types::InviteGuestData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    if data.email.trim().is_empty() {
        return Err(APIError::InvalidData(
            "Guest email is required".to_string(),
        ));
    }
    let guest: eventflow_api_types::Guest = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        let guest = store.invite_guest(
            &auth,
            models::NewGuest {
                id: Uuid::new_v4(),
                event_id: data.event_id,
                user_id: None,
                name: data.name,
                email: Some(data.email),
                rsvp_status: models::RsvpStatus::Pending,
            },
        )?;
        // Mail delivery is handled by an external relay; without configured credentials the
        // invitation only exists in the guest list.
        match (get_mail_credentials_from_env(), &guest.email) {
            (Some((mail_user, _)), Some(email)) => {
                info!(
                    "Queueing invitation mail to <{}> for event {} (sender account {})",
                    email, guest.event_id, mail_user
                );
            }
            _ => {
                debug!(
                    "Mail credentials not configured, skipping invitation mail for event {}",
                    guest.event_id
                );
            }
        }
        Ok(guest)
    })
    .await??
    .into();

    Ok(HttpResponse::Created().json(guest))
}

#[post("/guests")]
async fn rsvp(
    data: web::Json<eventflow_api_types::RsvpData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    let guest: eventflow_api_types::Guest = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.rsvp(
            &auth,
            RsvpUpdate {
                event_id: data.event_id,
                name: data.name,
                email: data.email,
                rsvp_status: data.rsvp_status.map(|s| s.into()),
            },
        )?)
    })
    .await??
    .into();

    Ok(web::Json(guest))
}

#[get("/guests/event/{event_id}")]
async fn list_guests_for_event(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    let guests: Vec<eventflow_api_types::Guest> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.get_guests_for_event(&auth, event_id)?)
    })
    .await??
    .into_iter()
    .map(|g| g.into())
    .collect();

    Ok(web::Json(guests))
}

#[get("/guests/my")]
async fn list_own_guest_records(
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let records: Vec<eventflow_api_types::GuestWithEvent> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let auth = store.get_auth_token_for_session(&session_token)?;
            Ok(store.get_own_guest_records(&auth)?)
        })
        .await??
        .into_iter()
        .map(|r| r.into())
        .collect();

    Ok(web::Json(records))
}

#[delete("/guests/{event_id}")]
async fn withdraw_rsvp(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        store.withdraw_rsvp(&auth, event_id)?;
        Ok(())
    })
    .await??;

    Ok(HttpResponse::Ok().json(json!({"message": "RSVP removed"})))
}
