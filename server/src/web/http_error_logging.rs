use crate::web::api::APIError;
use log::{error, warn};

pub async fn error_logging_middleware<B: actix_web::body::MessageBody>(
    req: actix_web::dev::ServiceRequest,
    next: actix_web::middleware::Next<B>,
) -> Result<actix_web::dev::ServiceResponse<B>, actix_web::Error> {
    let response = next.call(req).await?;

    if let Some(error) = response.response().error() {
        if let Some(api_error) = error.as_error::<APIError>() {
            match api_error {
                APIError::PermissionDenied {
                    required_privilege,
                } => {
                    warn!(
                        "HTTP {} permission denied at <{}>. Client: <{}> Requires privilege: {:?}",
                        response.response().status(),
                        response.request().uri(),
                        response
                            .request()
                            .connection_info()
                            .realip_remote_addr()
                            .unwrap_or("unknown"),
                        required_privilege,
                    );
                }
                APIError::NotAuthenticated => {
                    warn!(
                        "HTTP {} unauthenticated request at <{}>. Client: <{}>",
                        response.response().status(),
                        response.request().uri(),
                        response
                            .request()
                            .connection_info()
                            .realip_remote_addr()
                            .unwrap_or("unknown"),
                    );
                }
                APIError::InvalidSessionToken => {
                    warn!(
                        "HTTP {} invalid session token. Client: <{}>",
                        response.response().status(),
                        response
                            .request()
                            .connection_info()
                            .realip_remote_addr()
                            .unwrap_or("unknown"),
                    );
                }
                APIError::InvalidCredentials | APIError::BlockedAccount => {
                    warn!(
                        "HTTP {} login refused. Client: <{}>",
                        response.response().status(),
                        response
                            .request()
                            .connection_info()
                            .realip_remote_addr()
                            .unwrap_or("unknown"),
                    );
                }
                APIError::NotExisting
                | APIError::AlreadyExisting
                | APIError::AlreadyProcessed
                | APIError::InvalidJson(_)
                | APIError::InvalidData(_) => {}
                APIError::InternalError(e) => {
                    error!(
                        "HTTP {} internal server error at <{}>: {}",
                        response.response().status(),
                        response.request().uri(),
                        e
                    );
                }
            }
        } else {
            error!(
                "HTTP {} unexpected error at <{}>: {:?}",
                response.response().status(),
                response.request().uri(),
                error
            );
        }
    }
    Ok(response)
}
