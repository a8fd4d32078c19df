use std::fmt::Display;

mod endpoints_admin;
mod endpoints_auth;
mod endpoints_event;
mod endpoints_feedback;
mod endpoints_guest;
mod endpoints_request;
mod endpoints_schedule;
#[cfg(test)]
mod tests;

use crate::auth_session::SessionToken;
use crate::data_store::auth_token::Privilege;
use crate::data_store::StoreError;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    web, HttpRequest, HttpResponse,
};
use serde_json::json;

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(get_api_service());
}

fn get_api_service() -> actix_web::Scope {
    let json_config =
        web::JsonConfig::default().error_handler(|err, _req| APIError::InvalidJson(err).into());
    web::scope("/api")
        .app_data(json_config)
        .service(endpoints_auth::register)
        .service(endpoints_auth::login)
        .service(endpoints_auth::logout)
        .service(endpoints_auth::current_user)
        .service(endpoints_event::list_events)
        .service(endpoints_event::get_event)
        .service(endpoints_event::create_event)
        .service(endpoints_event::update_event)
        .service(endpoints_event::delete_event)
        .service(endpoints_request::create_event_request)
        .service(endpoints_request::list_own_event_requests)
        .service(endpoints_request::list_event_requests)
        .service(endpoints_request::approve_event_request)
        .service(endpoints_request::reject_event_request)
        .service(endpoints_guest::invite_guest)
        .service(endpoints_guest::rsvp)
        .service(endpoints_guest::list_guests_for_event)
        .service(endpoints_guest::list_own_guest_records)
        .service(endpoints_guest::withdraw_rsvp)
        .service(endpoints_schedule::get_schedule)
        .service(endpoints_schedule::create_schedule_item)
        .service(endpoints_feedback::list_feedback)
        .service(endpoints_feedback::create_feedback)
        .service(endpoints_admin::list_users)
        .service(endpoints_admin::update_user)
        .service(endpoints_admin::get_platform_stats)
}

#[derive(Debug)]
pub enum APIError {
    NotExisting,
    AlreadyExisting,
    AlreadyProcessed,
    PermissionDenied {
        required_privilege: Privilege,
    },
    NotAuthenticated,
    InvalidSessionToken,
    InvalidCredentials,
    BlockedAccount,
    InvalidJson(actix_web::error::JsonPayloadError),
    InvalidData(String),
    InternalError(String),
}

impl Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExisting => f.write_str("Element does not exist")?,
            Self::AlreadyExisting => f.write_str("Element already exists")?,
            Self::AlreadyProcessed => f.write_str("Request has already been processed")?,
            Self::PermissionDenied { required_privilege } => {
                write!(
                    f,
                    "Client is not authorized to perform this action. Authentication as {} is required.",
                    required_privilege
                        .qualifying_roles()
                        .iter()
                        .map(|role| role.name().to_owned())
                        .collect::<Vec<String>>()
                        .join(" or "),
                )?;
            }
            Self::NotAuthenticated => {
                f.write_str("This action requires authentication, but client did not send an authentication session cookie.")?
            }
            Self::InvalidSessionToken => {
                f.write_str("This action requires authentication, but the session given by the client is not valid.")?
            }
            Self::InvalidCredentials => f.write_str("Invalid credentials")?,
            Self::BlockedAccount => {
                f.write_str("Your account has been blocked. Contact admin.")?
            }
            Self::InternalError(s) => {
                f.write_str("Internal error: ")?;
                f.write_str(s)?;
            }
            Self::InvalidJson(e) => {
                write!(f, "Invalid JSON request data: {}", e)?;
            }
            Self::InvalidData(e) => {
                write!(f, "Invalid request data: {}", e)?;
            }
        };
        Ok(())
    }
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse {
        let message = format!("{}", self);

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({
                "error": message
            }))
    }
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotExisting => StatusCode::NOT_FOUND,
            Self::AlreadyExisting => StatusCode::CONFLICT,
            Self::AlreadyProcessed => StatusCode::CONFLICT,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidSessionToken => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::BlockedAccount => StatusCode::FORBIDDEN,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::InvalidData(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(error) => {
                Self::InternalError(format!("Could not connect to database: {}", error))
            }
            StoreError::QueryError(diesel_error) => Self::InternalError(format!(
                "Error while executing database query: {}",
                diesel_error
            )),
            StoreError::NotExisting => Self::NotExisting,
            StoreError::ConflictEntityExists => Self::AlreadyExisting,
            StoreError::AlreadyProcessed => Self::AlreadyProcessed,
            StoreError::InvalidCredentials => Self::InvalidCredentials,
            StoreError::AccountBlocked => Self::BlockedAccount,
            StoreError::PermissionDenied { required_privilege } => Self::PermissionDenied {
                required_privilege,
            },
            StoreError::InvalidInputData(e) => Self::InvalidData(e),
            StoreError::InvalidDataInDatabase(e) => Self::InternalError(format!(
                "Data queried from database could not be deserialized: {}",
                e
            )),
        }
    }
}

impl From<actix_web::error::BlockingError> for APIError {
    fn from(_e: actix_web::error::BlockingError) -> Self {
        APIError::InternalError(
            "Could not get thread from thread pool for synchronous database operation.".to_owned(),
        )
    }
}

impl From<crate::auth_session::SessionError> for APIError {
    fn from(_e: crate::auth_session::SessionError) -> Self {
        APIError::InvalidSessionToken
    }
}

pub(crate) const SESSION_COOKIE_NAME: &str = "eventflow_session";
const SESSION_TOKEN_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(24 * 3600);

/// Extract and verify the client's session token from the session cookie.
fn session_token_from_request(
    request: &HttpRequest,
    secret: &str,
) -> Result<SessionToken, APIError> {
    let cookie = request
        .cookie(SESSION_COOKIE_NAME)
        .ok_or(APIError::NotAuthenticated)?;
    Ok(SessionToken::from_string(
        cookie.value(),
        secret,
        SESSION_TOKEN_MAX_AGE,
    )?)
}

/// Build the HTTP-only session cookie carrying the signed session token.
fn session_cookie(session_token: &SessionToken, secret: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, session_token.as_string(secret))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(actix_web::cookie::time::Duration::seconds(
            SESSION_TOKEN_MAX_AGE.as_secs() as i64,
        ))
        .finish()
}

/// Build an expired session cookie, instructing the client to drop its session.
fn removal_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}
