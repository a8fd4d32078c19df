use crate::data_store::models;
use crate::web::api::{session_token_from_request, APIError};
use crate::web::AppState;
use actix_web::{get, put, web, HttpRequest, Responder};
use uuid::Uuid;

#[get("/admin/users")]
async fn list_users(
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let users: Vec<eventflow_api_types::User> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.list_users(&auth)?)
    })
    .await??
    .into_iter()
    .map(|u| u.into())
    .collect();

    Ok(web::Json(users))
}

#[put("/admin/users/{user_id}")]
async fn update_user(
    path: web::Path<Uuid>,
    data: web::Json<eventflow_api_types::UserPatchData>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let user_id = path.into_inner();
    let session_token = session_token_from_request(&request, &state.secret)?;
    let data = data.into_inner();
    let user: eventflow_api_types::User = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.update_user(
            &auth,
            user_id,
            models::UserPatch {
                name: data.name,
                role: data.role.map(|r| r.into()),
                is_active: data.is_active,
            },
        )?)
    })
    .await??
    .into();

    Ok(web::Json(user))
}

#[get("/admin/stats")]
async fn get_platform_stats(
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let stats: eventflow_api_types::PlatformStats = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.get_platform_stats(&auth)?)
    })
    .await??
    .into();

    Ok(web::Json(stats))
}
