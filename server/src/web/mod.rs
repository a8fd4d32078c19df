use crate::cli_error::CliError;
use crate::data_store::get_store_from_env;
use crate::setup::{
    get_admin_seed_from_env, get_frontend_origin_from_env, get_listen_address_from_env,
    get_listen_port_from_env, get_secret_from_env,
};
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

mod api;
mod http_error_logging;

pub fn serve() -> Result<(), CliError> {
    log::info!("Starting EventFlow server {} ...", crate::get_version());
    crate::cli::database_migration::check_migration_state()?;
    let state = AppState::new()?;
    if let Some((email, password)) = get_admin_seed_from_env() {
        crate::cli::seed_admin(state.store.as_ref(), &email, &password)?;
    }

    let frontend_origin = get_frontend_origin_from_env()?;
    actix_web::rt::System::new()
        .block_on(
            HttpServer::new(move || {
                // Session cookies only work cross-origin if the single frontend origin is
                // explicitly allowed and credentials are enabled.
                let cors = Cors::default()
                    .allowed_origin(&frontend_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                    .allowed_header(header::CONTENT_TYPE)
                    .supports_credentials();
                App::new()
                    .configure(api::configure_app)
                    .app_data(web::Data::new(state.clone()))
                    .wrap(middleware::Compress::default())
                    .wrap(middleware::from_fn(
                        http_error_logging::error_logging_middleware,
                    ))
                    .wrap(cors)
            })
            .bind((get_listen_address_from_env()?, get_listen_port_from_env()?))
            .map_err(CliError::BindError)?
            .run(),
        )
        .map_err(CliError::ServerError)
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn crate::data_store::EventFlowStore>,
    secret: String,
}

impl AppState {
    pub fn new() -> Result<Self, CliError> {
        Ok(Self {
            store: Arc::new(get_store_from_env()?),
            secret: get_secret_from_env()?,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_store(store: Arc<dyn crate::data_store::EventFlowStore>) -> Self {
        Self {
            store,
            secret: "unittest-secret".to_string(),
        }
    }
}
