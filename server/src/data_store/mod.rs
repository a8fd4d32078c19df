//! The backend part of the backend: the database interface
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [EventFlowStore] trait. This object can be shared between threads in a
//! global application state and be used to create [EventFlowStoreFacade] instances for interaction
//! with the database. These provide a CRUD-like interface, using the data models from the [models]
//! module.
//!
//! The primary implementation of [EventFlowStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool and its corresponding [EventFlowStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold a reference to one pooled connection each, using the
//! Diesel query DSL for implementing the database interaction.
//!
//! There is also a mock implementation for unittests.

use crate::auth_session::SessionToken;
use crate::cli_error::CliError;
use crate::cli_error::CliError::UnexpectedStoreError;
use crate::data_store::auth_token::Privilege;
use crate::setup;
use auth_token::{AuthToken, GlobalAuthToken};

pub mod auth_token;
pub mod models;
pub mod password;
mod postgres;
mod schema;
#[cfg(test)]
pub mod store_mock;

/// Get an [EventFlowStore] instance, according to the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PostgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl EventFlowStore, CliError> {
    postgres::PgDataStore::new(&setup::get_database_url_from_env()?)
        .map_err(|err| UnexpectedStoreError(err.to_string()))
}

pub type UserId = uuid::Uuid;
pub type EventId = uuid::Uuid;
pub type RequestId = uuid::Uuid;
pub type GuestId = uuid::Uuid;
pub type ScheduleItemId = uuid::Uuid;
pub type FeedbackId = uuid::Uuid;

pub trait EventFlowStoreFacade {
    /// Create a new user account with the default `user` role.
    ///
    /// This is the unauthenticated registration entry point; the role of the given record is
    /// overridden with [auth_token::Role::User]. Returns
    /// `Err(StoreError::ConflictEntityExists)` if the email address is already taken.
    fn register_user(&mut self, user: models::NewUser) -> Result<models::User, StoreError>;

    /// Create a new user account with an arbitrary role. Only available to the command line
    /// interface, for seeding the admin account.
    fn create_user(
        &mut self,
        auth_token: &GlobalAuthToken,
        user: models::NewUser,
    ) -> Result<models::User, StoreError>;

    fn get_user(&mut self, user_id: UserId) -> Result<models::User, StoreError>;
    fn get_user_by_email(&mut self, email: &str) -> Result<models::User, StoreError>;
    fn list_users(&mut self, auth_token: &AuthToken) -> Result<Vec<models::User>, StoreError>;
    fn update_user(
        &mut self,
        auth_token: &AuthToken,
        user_id: UserId,
        patch: models::UserPatch,
    ) -> Result<models::User, StoreError>;
    fn get_platform_stats(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<models::PlatformStats, StoreError>;

    /// Get a filtered list of events with the organizer's name joined in, sorted by date.
    fn get_events(
        &mut self,
        filter: EventFilter,
    ) -> Result<Vec<models::EventWithOrganizer>, StoreError>;
    fn get_event(&mut self, event_id: EventId)
        -> Result<models::EventWithOrganizer, StoreError>;
    fn create_event(
        &mut self,
        auth_token: &AuthToken,
        event: models::NewEvent,
    ) -> Result<models::Event, StoreError>;
    /// Partially update an event. Fields that are `None` in the patch keep their stored value.
    ///
    /// Permitted to the event's organizer or a role qualifying for
    /// [Privilege::ManageEvents].
    fn update_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
        patch: models::EventPatch,
    ) -> Result<models::Event, StoreError>;
    /// Delete an event together with all guest and schedule records referencing it. Requires
    /// [Privilege::DeleteEvents].
    ///
    /// The cascade runs in a single database transaction, so a failure partway leaves no
    /// half-deleted event behind.
    fn delete_event(&mut self, auth_token: &AuthToken, event_id: EventId)
        -> Result<(), StoreError>;

    fn create_event_request(
        &mut self,
        auth_token: &AuthToken,
        request: models::NewEventRequest,
    ) -> Result<models::EventRequest, StoreError>;
    /// Get the calling user's own event requests, newest first.
    fn get_own_event_requests(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::EventRequest>, StoreError>;
    /// Get all event requests with the requester's name and email joined in, newest first.
    fn list_event_requests(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::EventRequestWithUser>, StoreError>;
    /// Approve a pending event request.
    ///
    /// Performs three effects in a single database transaction: creates the event with the
    /// requester as organizer, sets the requester's role to `organizer` and marks the request
    /// approved. Returns `Err(StoreError::AlreadyProcessed)` if the request is not pending.
    fn approve_event_request(
        &mut self,
        auth_token: &AuthToken,
        request_id: RequestId,
    ) -> Result<(models::EventRequest, models::Event), StoreError>;
    /// Reject a pending event request.
    ///
    /// Returns `Err(StoreError::AlreadyProcessed)` if the request is not pending.
    fn reject_event_request(
        &mut self,
        auth_token: &AuthToken,
        request_id: RequestId,
    ) -> Result<models::EventRequest, StoreError>;

    /// Invite a guest to an event by email address.
    ///
    /// Permitted to the event's organizer or admin. Returns
    /// `Err(StoreError::ConflictEntityExists)` if the email address is already invited to the
    /// event.
    fn invite_guest(
        &mut self,
        auth_token: &AuthToken,
        guest: models::NewGuest,
    ) -> Result<models::Guest, StoreError>;
    /// Create or update the calling user's RSVP for an event.
    ///
    /// The operation is idempotent per (event, user): the first call creates a guest record
    /// (status defaulting to accepted), subsequent calls update the existing record. A guest
    /// record previously created by an email invitation for the same email address is claimed by
    /// the user instead of inserting a conflicting second record. Name and email are only
    /// overwritten when explicitly supplied.
    fn rsvp(
        &mut self,
        auth_token: &AuthToken,
        rsvp: RsvpUpdate,
    ) -> Result<models::Guest, StoreError>;
    fn get_guests_for_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
    ) -> Result<Vec<models::Guest>, StoreError>;
    /// Get the calling user's guest records with the referenced events embedded.
    fn get_own_guest_records(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::GuestWithEvent>, StoreError>;
    /// Remove the calling user's RSVP for the given event.
    fn withdraw_rsvp(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
    ) -> Result<(), StoreError>;

    fn get_schedule(&mut self, event_id: EventId)
        -> Result<Vec<models::ScheduleItem>, StoreError>;
    fn create_schedule_item(
        &mut self,
        auth_token: &AuthToken,
        item: models::NewScheduleItem,
    ) -> Result<models::ScheduleItem, StoreError>;

    /// Get all feedback entries, newest first.
    fn list_feedback(&mut self) -> Result<Vec<models::Feedback>, StoreError>;
    fn create_feedback(
        &mut self,
        auth_token: &AuthToken,
        comment: String,
        rating: i32,
    ) -> Result<models::Feedback, StoreError>;

    /// Try to authenticate a client with email address and password.
    ///
    /// On success, a fresh session token bound to the user's id is returned together with the
    /// user record. Fails with [StoreError::InvalidCredentials] for an unknown email address or a
    /// wrong password and with [StoreError::AccountBlocked] for a deactivated account, even if
    /// the credentials are correct.
    fn authenticate_user(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(models::User, SessionToken), StoreError>;

    /// Get an [AuthToken] instance for a client, representing the client's identity and role.
    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError>;
}

/// Filter options for retrieving events from the store via [EventFlowStoreFacade::get_events]
#[derive(Default, Clone)]
pub struct EventFilter {
    /// Filter for events taking place at or after the given point in time
    pub after: Option<chrono::DateTime<chrono::Utc>>,
    /// Filter for events taking place before the given point in time
    pub before: Option<chrono::DateTime<chrono::Utc>>,
}

impl EventFilter {
    /// Filter for upcoming events: today (UTC midnight) or later.
    pub fn upcoming(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            after: Some(start_of_day(now)),
            before: None,
        }
    }

    /// Filter for past events: before today (UTC midnight).
    pub fn past(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            after: None,
            before: Some(start_of_day(now)),
        }
    }

    /// Checks if a given event matches the filter
    ///
    /// Usually, filtering should be done by the database. This function can be used for separate
    /// checks of individual events in software.
    pub fn matches(&self, event: &models::Event) -> bool {
        if let Some(after) = self.after {
            if event.date < after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if event.date >= before {
                return false;
            }
        }
        true
    }
}

fn start_of_day(now: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc
        .from_utc_datetime(&now.date_naive().and_time(chrono::NaiveTime::MIN))
}

/// Parameters of an RSVP upsert for the calling user, see [EventFlowStoreFacade::rsvp].
#[derive(Clone)]
pub struct RsvpUpdate {
    pub event_id: EventId,
    /// Explicit display name; `None` keeps the stored name (or defaults to the user's name on
    /// first RSVP).
    pub name: Option<String>,
    /// Explicit contact email; `None` keeps the stored email (or defaults to the user's email on
    /// first RSVP).
    pub email: Option<String>,
    /// Explicit RSVP status; `None` defaults to accepted.
    pub rsvp_status: Option<models::RsvpStatus>,
}

pub trait EventFlowStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn EventFlowStoreFacade + 'a>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection to the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members
    /// (see string description)
    QueryError(diesel::result::Error),
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because a conflicting entity already exists (e.g. a user
    /// with the same email address or a guest record for the same identity).
    ConflictEntityExists,
    /// The event request has already been approved or rejected and cannot be processed again.
    AlreadyProcessed,
    /// Authentication failed due to an unknown email address or a wrong password.
    InvalidCredentials,
    /// Authentication refused because the account has been deactivated by an admin.
    AccountBlocked,
    /// The client is not authorized for this action. It would need to be logged in to an account
    /// with a role qualifying for the `required_privilege`.
    PermissionDenied { required_privilege: Privilege },
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                e @ diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | e @ diesel::result::DatabaseErrorKind::CheckViolation,
                _,
            ) => Self::InvalidInputData(format!("{:?}", e)),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Database record exists already."),
            Self::AlreadyProcessed => f.write_str("Request already processed."),
            Self::InvalidCredentials => f.write_str("Invalid credentials."),
            Self::AccountBlocked => {
                f.write_str("Your account has been blocked. Contact admin.")
            }
            Self::PermissionDenied { required_privilege } => {
                write!(
                    f,
                    "Client is not authorized to perform this action. {:?} privilege required.",
                    required_privilege
                )
            }
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            StoreError::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreError {}
