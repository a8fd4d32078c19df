use crate::data_store::models;
use crate::web::api::{session_token_from_request, APIError};
use crate::web::AppState;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

#[get("/schedules/events/{event_id}")]
async fn get_schedule(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let items: Vec<eventflow_api_types::ScheduleItem> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            Ok(store.get_schedule(event_id)?)
        })
        .await??
        .into_iter()
        .map(|i| i.into())
        .collect();

    Ok(web::Json(items))
}

#[post("/schedules")]
async fn create_schedule_item(
    data: web::Json<eventflow_api_types::NewScheduleItemData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    if data.time.trim().is_empty() || data.activity.trim().is_empty() {
        return Err(APIError::InvalidData(
            "Schedule time and activity are required".to_string(),
        ));
    }
    let item: eventflow_api_types::ScheduleItem = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.create_schedule_item(
            &auth,
            models::NewScheduleItem {
                id: Uuid::new_v4(),
                event_id: data.event_id,
                time: data.time,
                activity: data.activity,
            },
        )?)
    })
    .await??
    .into();

    Ok(HttpResponse::Created().json(item))
}
