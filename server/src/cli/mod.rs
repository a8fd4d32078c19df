//! Command line administration functions, dispatched from the main binary's subcommands.

pub mod database_migration;

use crate::cli_error::CliError;
use crate::data_store::auth_token::{GlobalAuthToken, Role};
use crate::data_store::{self, models, password, EventFlowStore, StoreError};
use crate::setup;
use log::info;

pub struct CliAuthTokenKey {
    _private: (),
}

impl CliAuthTokenKey {
    #[allow(clippy::new_without_default)] // We always want to explicitly create these objects
    pub fn new() -> Self {
        Self { _private: () }
    }
}

/// Migrate the database schema to the latest version. Entry point of the `migrate-database`
/// subcommand.
pub fn migrate_database() -> Result<(), CliError> {
    database_migration::run_migrations()
}

/// Create the admin account from the ADMIN_EMAIL and ADMIN_PASSWORD environment variables, if it
/// does not exist yet. Entry point of the `seed-admin` subcommand, also executed at web server
/// startup when the variables are set.
pub fn seed_admin_from_env() -> Result<(), CliError> {
    let Some((email, password_cleartext)) = setup::get_admin_seed_from_env() else {
        return Err(CliError::SetupError(
            "Environment variables ADMIN_EMAIL and ADMIN_PASSWORD must be defined".to_string(),
        ));
    };
    let store = data_store::get_store_from_env()?;
    seed_admin(&store, &email, &password_cleartext)
}

pub fn seed_admin(
    store: &dyn EventFlowStore,
    email: &str,
    password_cleartext: &str,
) -> Result<(), CliError> {
    let mut facade = store.get_facade()?;
    match facade.get_user_by_email(email) {
        Ok(user) => {
            info!("Admin account {} exists already. Nothing to do.", user.email);
            Ok(())
        }
        Err(StoreError::NotExisting) => {
            let password_hash = password::hash_password(password_cleartext)
                .map_err(|e| CliError::UnexpectedStoreError(e.to_string()))?;
            let auth_token = GlobalAuthToken::create_for_cli(&CliAuthTokenKey::new());
            let user = facade.create_user(
                &auth_token,
                models::NewUser::new(
                    "Admin".to_string(),
                    email.to_string(),
                    password_hash,
                    Role::Admin,
                ),
            )?;
            info!("Created admin account {}.", user.email);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
