use crate::data_store::{models, password};
use crate::web::api::{
    removal_session_cookie, session_cookie, session_token_from_request, APIError,
};
use crate::web::AppState;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

#[post("/register")]
async fn register(
    data: web::Json<eventflow_api_types::RegisterData>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let data = data.into_inner();
    if data.name.trim().is_empty() || data.email.trim().is_empty() || data.password.is_empty() {
        return Err(APIError::InvalidData(
            "Name, email and password are required".to_string(),
        ));
    }
    let user: eventflow_api_types::User = web::block(move || -> Result<_, APIError> {
        let password_hash = password::hash_password(&data.password)
            .map_err(|e| APIError::InternalError(e.to_string()))?;
        let mut store = state.store.get_facade()?;
        Ok(store.register_user(models::NewUser::new(
            data.name,
            data.email,
            password_hash,
            crate::data_store::auth_token::Role::User,
        ))?)
    })
    .await??
    .into();

    Ok(HttpResponse::Created().json(user))
}

#[post("/login")]
async fn login(
    data: web::Json<eventflow_api_types::LoginData>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let data = data.into_inner();
    let secret = state.secret.clone();
    let (user, session_token) = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.authenticate_user(&data.email, &data.password)?)
    })
    .await??;
    let user: eventflow_api_types::User = user.into();

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session_token, &secret))
        .json(user))
}

#[post("/logout")]
async fn logout() -> Result<impl Responder, APIError> {
    Ok(HttpResponse::Ok()
        .cookie(removal_session_cookie())
        .json(json!({"message": "Logged out"})))
}

#[get("/me")]
async fn current_user(
    request: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_request(&request, &state.secret)?;
    let user: eventflow_api_types::User = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = store.get_auth_token_for_session(&session_token)?;
        Ok(store.get_user(auth.user_id())?)
    })
    .await??
    .into();

    Ok(web::Json(user))
}
