use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role of a registered user.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Organizer,
    Admin,
}

/// A guest's response to an event invitation.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Pending,
    Accepted,
    Declined,
}

/// Processing state of an event request.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub organizer: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "organizerName")]
    pub organizer_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "adminNotes")]
    pub admin_notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Requester's name/email, only included in the admin listing.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "userName")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "userEmail")]
    pub user_email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub rsvp_status: RsvpStatus,
}

/// A guest record of the calling user with the referenced event embedded, as returned by the
/// "my RSVPs" listing.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GuestWithEvent {
    pub id: Uuid,
    pub event: Event,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub rsvp_status: RsvpStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub time: String,
    pub activity: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Feedback {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub comment: String,
    pub rating: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Payload of the account registration endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload of the login endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

/// Payload for creating an event directly via the admin interface. The organizer can be
/// referenced by email address or id; without either, the caller becomes the organizer.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewEventData {
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

/// Partial update of an event. Omitted fields keep their current value.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct EventPatchData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for submitting an event request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewEventRequestData {
    pub name: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

/// Payload for inviting a guest to an event by email address.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InviteGuestData {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Payload of the RSVP endpoint. Omitted name/email keep their stored value (or default to the
/// account's data on first RSVP), an omitted status counts as accepting.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RsvpData {
    pub event_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsvp_status: Option<RsvpStatus>,
}

/// Payload for adding a schedule item to an event.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewScheduleItemData {
    pub event_id: Uuid,
    pub time: String,
    pub activity: String,
}

/// Payload for submitting platform feedback.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewFeedbackData {
    pub comment: String,
    pub rating: i32,
}

/// Partial update of a user account via the admin interface. Omitted fields keep their current
/// value.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserPatchData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlatformStats {
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
    #[serde(rename = "totalEvents")]
    pub total_events: i64,
    #[serde(rename = "totalRequests")]
    pub total_requests: i64,
    #[serde(rename = "pendingRequests")]
    pub pending_requests: i64,
}
