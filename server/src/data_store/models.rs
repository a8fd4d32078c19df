use crate::data_store::auth_token::{EnumMemberNotExistingError, Role};
use crate::data_store::{EventId, UserId};
use chrono::{DateTime, Utc};
use diesel::deserialize::FromSql;
use diesel::prelude::*;
use diesel::query_builder::bind_collector::RawBytesBindCollector;
use diesel::serialize::ToSql;
use diesel::{AsExpression, FromSqlRow};
use uuid::Uuid;

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for eventflow_api_types::User {
    fn from(value: User) -> Self {
        // The password hash deliberately never crosses into the API representation.
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role.into(),
            is_active: value.is_active,
        }
    }
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::users)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

impl NewUser {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            is_active: true,
        }
    }
}

/// Partial update of a user account via the admin interface. `None` fields keep their stored
/// value.
#[derive(Clone, Default, AsChangeset)]
#[diesel(table_name=super::schema::users)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserPatch {
    /// True if the patch would not change any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.is_active.is_none()
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::events)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub organizer: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for eventflow_api_types::Event {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            name: value.name,
            date: value.date,
            location: value.location,
            description: value.description,
            organizer: value.organizer,
            organizer_name: None,
        }
    }
}

/// An event record with the organizer's display name joined from the users table.
#[derive(Clone, Debug)]
pub struct EventWithOrganizer {
    pub event: Event,
    pub organizer_name: String,
}

impl From<EventWithOrganizer> for eventflow_api_types::Event {
    fn from(value: EventWithOrganizer) -> Self {
        Self {
            organizer_name: Some(value.organizer_name),
            ..value.event.into()
        }
    }
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::events)]
pub struct NewEvent {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub organizer: UserId,
}

/// Partial update of an event. `None` fields keep their stored value.
#[derive(Clone, Default, AsChangeset)]
#[diesel(table_name=super::schema::events)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventPatch {
    /// True if the patch would not change any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.description.is_none()
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::event_requests)]
pub struct EventRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub event_type: String,
    pub date: DateTime<Utc>,
    pub budget: Option<f64>,
    pub requirements: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<EventRequest> for eventflow_api_types::EventRequest {
    fn from(value: EventRequest) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            name: value.name,
            event_type: value.event_type,
            date: value.date,
            budget: value.budget,
            requirements: value.requirements,
            status: value.status.into(),
            admin_notes: value.admin_notes,
            created_at: value.created_at,
            user_name: None,
            user_email: None,
        }
    }
}

/// An event request with the requester's name and email joined from the users table, for the
/// admin listing.
#[derive(Clone, Debug)]
pub struct EventRequestWithUser {
    pub request: EventRequest,
    pub user_name: String,
    pub user_email: String,
}

impl From<EventRequestWithUser> for eventflow_api_types::EventRequest {
    fn from(value: EventRequestWithUser) -> Self {
        Self {
            user_name: Some(value.user_name),
            user_email: Some(value.user_email),
            ..value.request.into()
        }
    }
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::event_requests)]
pub struct NewEventRequest {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub event_type: String,
    pub date: DateTime<Utc>,
    pub budget: Option<f64>,
    pub requirements: Option<String>,
    pub status: RequestStatus,
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::guests)]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub rsvp_status: RsvpStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Guest> for eventflow_api_types::Guest {
    fn from(value: Guest) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            user_id: value.user_id,
            name: value.name,
            email: value.email,
            rsvp_status: value.rsvp_status.into(),
        }
    }
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::guests)]
pub struct NewGuest {
    pub id: Uuid,
    pub event_id: EventId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Option<String>,
    pub rsvp_status: RsvpStatus,
}

/// A guest record with the referenced event embedded, for the "my RSVPs" listing.
#[derive(Clone, Debug)]
pub struct GuestWithEvent {
    pub guest: Guest,
    pub event: Event,
}

impl From<GuestWithEvent> for eventflow_api_types::GuestWithEvent {
    fn from(value: GuestWithEvent) -> Self {
        Self {
            id: value.guest.id,
            event: value.event.into(),
            name: value.guest.name,
            email: value.guest.email,
            rsvp_status: value.guest.rsvp_status.into(),
        }
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::schedules)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub time: String,
    pub activity: String,
}

impl From<ScheduleItem> for eventflow_api_types::ScheduleItem {
    fn from(value: ScheduleItem) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            time: value.time,
            activity: value.activity,
        }
    }
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::schedules)]
pub struct NewScheduleItem {
    pub id: Uuid,
    pub event_id: EventId,
    pub time: String,
    pub activity: String,
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::feedback)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub comment: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for eventflow_api_types::Feedback {
    fn from(value: Feedback) -> Self {
        Self {
            id: value.id,
            user: value.user_id,
            name: value.name,
            comment: value.comment,
            rating: value.rating,
            created_at: value.created_at,
        }
    }
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::feedback)]
pub struct NewFeedback {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub comment: String,
    pub rating: i32,
}

/// Aggregated platform counters for the admin dashboard.
#[derive(Clone, Copy, Debug)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_events: i64,
    pub total_requests: i64,
    pub pending_requests: i64,
}

impl From<PlatformStats> for eventflow_api_types::PlatformStats {
    fn from(value: PlatformStats) -> Self {
        Self {
            total_users: value.total_users,
            total_events: value.total_events,
            total_requests: value.total_requests,
            pending_requests: value.pending_requests,
        }
    }
}

#[derive(Debug, PartialEq, FromSqlRow, AsExpression, Eq, Clone, Copy)]
#[diesel(sql_type = diesel::sql_types::Integer)]
#[repr(i32)]
pub enum RequestStatus {
    Pending = 1,
    Approved = 2,
    Rejected = 3,
}

impl TryFrom<i32> for RequestStatus {
    type Error = EnumMemberNotExistingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RequestStatus::Pending),
            2 => Ok(RequestStatus::Approved),
            3 => Ok(RequestStatus::Rejected),
            value => Err(EnumMemberNotExistingError {
                member_value: value,
                enum_name: "RequestStatus",
            }),
        }
    }
}

impl From<RequestStatus> for i32 {
    fn from(value: RequestStatus) -> Self {
        value as i32
    }
}

impl From<RequestStatus> for eventflow_api_types::RequestStatus {
    fn from(value: RequestStatus) -> Self {
        match value {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::Approved => Self::Approved,
            RequestStatus::Rejected => Self::Rejected,
        }
    }
}

impl<DB> ToSql<diesel::sql_types::Integer, DB> for RequestStatus
where
    DB: diesel::backend::Backend,
    for<'c> DB: diesel::backend::Backend<BindCollector<'c> = RawBytesBindCollector<DB>>,
    i32: ToSql<diesel::sql_types::Integer, DB>,
{
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, DB>,
    ) -> diesel::serialize::Result {
        let value: i32 = (*self).into();
        value.to_sql(&mut out.reborrow())
    }
}

impl<DB> FromSql<diesel::sql_types::Integer, DB> for RequestStatus
where
    DB: diesel::backend::Backend,
    i32: FromSql<diesel::sql_types::Integer, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let x = i32::from_sql(bytes)?;
        x.try_into()
            .map_err(|e: EnumMemberNotExistingError| e.to_string().into())
    }
}

#[derive(Debug, PartialEq, FromSqlRow, AsExpression, Eq, Clone, Copy)]
#[diesel(sql_type = diesel::sql_types::Integer)]
#[repr(i32)]
pub enum RsvpStatus {
    Pending = 1,
    Accepted = 2,
    Declined = 3,
}

impl TryFrom<i32> for RsvpStatus {
    type Error = EnumMemberNotExistingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RsvpStatus::Pending),
            2 => Ok(RsvpStatus::Accepted),
            3 => Ok(RsvpStatus::Declined),
            value => Err(EnumMemberNotExistingError {
                member_value: value,
                enum_name: "RsvpStatus",
            }),
        }
    }
}

impl From<RsvpStatus> for i32 {
    fn from(value: RsvpStatus) -> Self {
        value as i32
    }
}

impl From<RsvpStatus> for eventflow_api_types::RsvpStatus {
    fn from(value: RsvpStatus) -> Self {
        match value {
            RsvpStatus::Pending => Self::Pending,
            RsvpStatus::Accepted => Self::Accepted,
            RsvpStatus::Declined => Self::Declined,
        }
    }
}

impl From<eventflow_api_types::RsvpStatus> for RsvpStatus {
    fn from(value: eventflow_api_types::RsvpStatus) -> Self {
        match value {
            eventflow_api_types::RsvpStatus::Pending => Self::Pending,
            eventflow_api_types::RsvpStatus::Accepted => Self::Accepted,
            eventflow_api_types::RsvpStatus::Declined => Self::Declined,
        }
    }
}

impl<DB> ToSql<diesel::sql_types::Integer, DB> for RsvpStatus
where
    DB: diesel::backend::Backend,
    for<'c> DB: diesel::backend::Backend<BindCollector<'c> = RawBytesBindCollector<DB>>,
    i32: ToSql<diesel::sql_types::Integer, DB>,
{
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, DB>,
    ) -> diesel::serialize::Result {
        let value: i32 = (*self).into();
        value.to_sql(&mut out.reborrow())
    }
}

impl<DB> FromSql<diesel::sql_types::Integer, DB> for RsvpStatus
where
    DB: diesel::backend::Backend,
    i32: FromSql<diesel::sql_types::Integer, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let x = i32::from_sql(bytes)?;
        x.try_into()
            .map_err(|e: EnumMemberNotExistingError| e.to_string().into())
    }
}
