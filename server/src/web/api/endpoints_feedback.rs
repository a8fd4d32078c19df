use crate::web::api::{session_token_from_request, APIError};
use crate::web::AppState;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};

#[get("/feedback")]
async fn list_feedback(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let feedback: Vec<eventflow_api_types::Feedback> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.list_feedback()?)
    })
    .await??
    .into_iter()
    .map(|f| f.into())
    .collect();

    Ok(web::Json(feedback))
}

#[post("/feedback")]
async fn create_feedback(
    data: web::Json<eventflow_api_types::NewFeedbackData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    if data.comment.trim().is_empty() {
        return Err(APIError::InvalidData("Comment is required".to_string()));
    }
    let feedback: eventflow_api_types::Feedback = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.create_feedback(&auth, data.comment, data.rating)?)
    })
    .await??
    .into();

    Ok(HttpResponse::Created().json(feedback))
}
