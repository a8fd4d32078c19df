//! Endpoint tests, running the full actix-web service against the mock data store.


/// Build the test service with the full API routing and the given mock store.
macro_rules! init_test_app {
    ($store:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(crate::web::api::configure_app)
                .app_data(actix_web::web::Data::new(
                    crate::web::AppState::with_store($store),
                )),
        )
    };
}
pub(crate) use init_test_app;

mod test_feedback;
mod test_schedule;
