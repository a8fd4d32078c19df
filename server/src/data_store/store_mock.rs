use crate::auth_session::SessionToken;
use crate::data_store::auth_token::{AuthToken, GlobalAuthToken, Privilege, Role};
use crate::data_store::models::{RequestStatus, RsvpStatus};
use crate::data_store::{
    models, password, EventFilter, EventFlowStore, EventFlowStoreFacade, EventId, RequestId,
    RsvpUpdate, StoreError,
};
use std::sync::Mutex;
use uuid::Uuid;

/**
 * A mock [EventFlowStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of entities. These
 * can be directly modified by the tests.
 *
 * Unlike a pure stub, this mock replicates the privilege checks and uniqueness rules of the real
 * store, so endpoint tests can verify authorization and conflict behavior. The
 * [StoreMockData::next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl EventFlowStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn EventFlowStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub users: Vec<models::User>,
    pub events: Vec<models::Event>,
    pub requests: Vec<models::EventRequest>,
    pub guests: Vec<models::Guest>,
    pub schedules: Vec<models::ScheduleItem>,
    pub feedback: Vec<models::Feedback>,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
}

impl StoreMockData {
    fn user(&self, user_id: Uuid) -> Result<&models::User, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotExisting)
    }

    fn event(&self, event_id: Uuid) -> Result<&models::Event, StoreError> {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or(StoreError::NotExisting)
    }

    fn organizer_name(&self, event: &models::Event) -> String {
        self.users
            .iter()
            .find(|u| u.id == event.organizer)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    }
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl<'a> EventFlowStoreFacade for StoreMockFacade<'a> {
    fn register_user(&mut self, user: models::NewUser) -> Result<models::User, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::ConflictEntityExists);
        }
        let user = models::User {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::User,
            is_active: user.is_active,
            created_at: chrono::Utc::now(),
        };
        data.users.push(user.clone());
        Ok(user)
    }

    fn create_user(
        &mut self,
        _auth_token: &GlobalAuthToken,
        user: models::NewUser,
    ) -> Result<models::User, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::ConflictEntityExists);
        }
        let user = models::User {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: user.is_active,
            created_at: chrono::Utc::now(),
        };
        data.users.push(user.clone());
        Ok(user)
    }

    fn get_user(&mut self, user_id: Uuid) -> Result<models::User, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.user(user_id).cloned()
    }

    fn get_user_by_email(&mut self, email: &str) -> Result<models::User, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn list_users(&mut self, auth_token: &AuthToken) -> Result<Vec<models::User>, StoreError> {
        auth_token.check_privilege(Privilege::ManageUsers)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut users = data.users.clone();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    fn update_user(
        &mut self,
        auth_token: &AuthToken,
        user_id: Uuid,
        patch: models::UserPatch,
    ) -> Result<models::User, StoreError> {
        auth_token.check_privilege(Privilege::ManageUsers)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotExisting)?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        Ok(user.clone())
    }

    fn get_platform_stats(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<models::PlatformStats, StoreError> {
        auth_token.check_privilege(Privilege::ViewPlatformStats)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(models::PlatformStats {
            total_users: data.users.len() as i64,
            total_events: data.events.len() as i64,
            total_requests: data.requests.len() as i64,
            pending_requests: data
                .requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count() as i64,
        })
    }

    fn get_events(
        &mut self,
        filter: EventFilter,
    ) -> Result<Vec<models::EventWithOrganizer>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut events: Vec<models::Event> = data
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        Ok(events
            .into_iter()
            .map(|event| models::EventWithOrganizer {
                organizer_name: data.organizer_name(&event),
                event,
            })
            .collect())
    }

    fn get_event(&mut self, event_id: EventId) -> Result<models::EventWithOrganizer, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let event = data.event(event_id)?.clone();
        Ok(models::EventWithOrganizer {
            organizer_name: data.organizer_name(&event),
            event,
        })
    }

    fn create_event(
        &mut self,
        auth_token: &AuthToken,
        event: models::NewEvent,
    ) -> Result<models::Event, StoreError> {
        auth_token.check_privilege(Privilege::CreateEvents)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let event = models::Event {
            id: event.id,
            name: event.name,
            date: event.date,
            location: event.location,
            description: event.description,
            organizer: event.organizer,
            created_at: chrono::Utc::now(),
        };
        data.events.push(event.clone());
        Ok(event)
    }

    fn update_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
        patch: models::EventPatch,
    ) -> Result<models::Event, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let organizer = data.event(event_id)?.organizer;
        auth_token.check_event_privilege(organizer, Privilege::ManageEvents)?;
        let event = data
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(StoreError::NotExisting)?;
        if let Some(name) = patch.name {
            event.name = name;
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        Ok(event.clone())
    }

    fn delete_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
    ) -> Result<(), StoreError> {
        auth_token.check_privilege(Privilege::DeleteEvents)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.event(event_id)?;
        data.guests.retain(|g| g.event_id != event_id);
        data.schedules.retain(|s| s.event_id != event_id);
        data.events.retain(|e| e.id != event_id);
        Ok(())
    }

    fn create_event_request(
        &mut self,
        auth_token: &AuthToken,
        request: models::NewEventRequest,
    ) -> Result<models::EventRequest, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let request = models::EventRequest {
            id: request.id,
            user_id: auth_token.user_id(),
            name: request.name,
            event_type: request.event_type,
            date: request.date,
            budget: request.budget,
            requirements: request.requirements,
            status: RequestStatus::Pending,
            admin_notes: None,
            created_at: chrono::Utc::now(),
        };
        data.requests.push(request.clone());
        Ok(request)
    }

    fn get_own_event_requests(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::EventRequest>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut requests: Vec<models::EventRequest> = data
            .requests
            .iter()
            .filter(|r| r.user_id == auth_token.user_id())
            .cloned()
            .collect();
        requests.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(requests)
    }

    fn list_event_requests(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::EventRequestWithUser>, StoreError> {
        auth_token.check_privilege(Privilege::ListEventRequests)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut requests = data.requests.clone();
        requests.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(requests
            .into_iter()
            .map(|request| {
                let user = data.users.iter().find(|u| u.id == request.user_id);
                models::EventRequestWithUser {
                    user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    request,
                }
            })
            .collect())
    }

    fn approve_event_request(
        &mut self,
        auth_token: &AuthToken,
        request_id: RequestId,
    ) -> Result<(models::EventRequest, models::Event), StoreError> {
        auth_token.check_privilege(Privilege::ProcessEventRequests)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let request = data
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or(StoreError::NotExisting)?
            .clone();
        if request.status != RequestStatus::Pending {
            return Err(StoreError::AlreadyProcessed);
        }

        let description = match &request.requirements {
            Some(requirements) => format!(
                "Event type: {}. Requirements: {}",
                request.event_type, requirements
            ),
            None => format!("Event type: {}", request.event_type),
        };
        let event = models::Event {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            date: request.date,
            location: "To be decided".to_string(),
            description,
            organizer: request.user_id,
            created_at: chrono::Utc::now(),
        };
        data.events.push(event.clone());

        if let Some(user) = data.users.iter_mut().find(|u| u.id == request.user_id) {
            user.role = Role::Organizer;
        }

        let request = data
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(StoreError::NotExisting)?;
        request.status = RequestStatus::Approved;
        Ok((request.clone(), event))
    }

    fn reject_event_request(
        &mut self,
        auth_token: &AuthToken,
        request_id: RequestId,
    ) -> Result<models::EventRequest, StoreError> {
        auth_token.check_privilege(Privilege::ProcessEventRequests)?;
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let request = data
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(StoreError::NotExisting)?;
        if request.status != RequestStatus::Pending {
            return Err(StoreError::AlreadyProcessed);
        }
        request.status = RequestStatus::Rejected;
        Ok(request.clone())
    }

    fn invite_guest(
        &mut self,
        auth_token: &AuthToken,
        guest: models::NewGuest,
    ) -> Result<models::Guest, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let organizer = data.event(guest.event_id)?.organizer;
        auth_token.check_event_privilege(organizer, Privilege::ManageEvents)?;
        if data
            .guests
            .iter()
            .any(|g| g.event_id == guest.event_id && g.email.is_some() && g.email == guest.email)
        {
            return Err(StoreError::ConflictEntityExists);
        }
        let guest = models::Guest {
            id: guest.id,
            event_id: guest.event_id,
            user_id: guest.user_id,
            name: guest.name,
            email: guest.email,
            rsvp_status: guest.rsvp_status,
            created_at: chrono::Utc::now(),
        };
        data.guests.push(guest.clone());
        Ok(guest)
    }

    fn rsvp(
        &mut self,
        auth_token: &AuthToken,
        rsvp: RsvpUpdate,
    ) -> Result<models::Guest, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.event(rsvp.event_id)?;
        let user = data.user(auth_token.user_id())?.clone();
        let new_status = rsvp.rsvp_status.unwrap_or(RsvpStatus::Accepted);
        let effective_email = rsvp.email.clone().unwrap_or_else(|| user.email.clone());

        if let Some(guest) = data
            .guests
            .iter_mut()
            .find(|g| g.event_id == rsvp.event_id && g.user_id == Some(user.id))
        {
            if let Some(name) = rsvp.name {
                guest.name = name;
            }
            if let Some(email) = rsvp.email {
                guest.email = Some(email);
            }
            guest.rsvp_status = new_status;
            return Ok(guest.clone());
        }

        if let Some(guest) = data.guests.iter_mut().find(|g| {
            g.event_id == rsvp.event_id
                && g.user_id.is_none()
                && g.email.as_deref() == Some(effective_email.as_str())
        }) {
            guest.user_id = Some(user.id);
            if let Some(name) = rsvp.name {
                guest.name = name;
            }
            guest.rsvp_status = new_status;
            return Ok(guest.clone());
        }

        let guest = models::Guest {
            id: Uuid::new_v4(),
            event_id: rsvp.event_id,
            user_id: Some(user.id),
            name: rsvp.name.unwrap_or(user.name),
            email: Some(effective_email),
            rsvp_status: new_status,
            created_at: chrono::Utc::now(),
        };
        data.guests.push(guest.clone());
        Ok(guest)
    }

    fn get_guests_for_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
    ) -> Result<Vec<models::Guest>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let organizer = data.event(event_id)?.organizer;
        auth_token.check_event_privilege(organizer, Privilege::ManageEvents)?;
        let mut guests: Vec<models::Guest> = data
            .guests
            .iter()
            .filter(|g| g.event_id == event_id)
            .cloned()
            .collect();
        guests.sort_by_key(|g| g.created_at);
        Ok(guests)
    }

    fn get_own_guest_records(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::GuestWithEvent>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut records: Vec<models::GuestWithEvent> = data
            .guests
            .iter()
            .filter(|g| g.user_id == Some(auth_token.user_id()))
            .filter_map(|g| {
                data.events
                    .iter()
                    .find(|e| e.id == g.event_id)
                    .map(|e| models::GuestWithEvent {
                        guest: g.clone(),
                        event: e.clone(),
                    })
            })
            .collect();
        records.sort_by_key(|r| r.event.date);
        Ok(records)
    }

    fn withdraw_rsvp(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
    ) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let len_before = data.guests.len();
        data.guests
            .retain(|g| !(g.event_id == event_id && g.user_id == Some(auth_token.user_id())));
        if data.guests.len() == len_before {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn get_schedule(
        &mut self,
        event_id: EventId,
    ) -> Result<Vec<models::ScheduleItem>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.event(event_id)?;
        let mut items: Vec<models::ScheduleItem> = data
            .schedules
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(items)
    }

    fn create_schedule_item(
        &mut self,
        auth_token: &AuthToken,
        item: models::NewScheduleItem,
    ) -> Result<models::ScheduleItem, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let organizer = data.event(item.event_id)?.organizer;
        auth_token.check_event_privilege(organizer, Privilege::ManageEvents)?;
        let item = models::ScheduleItem {
            id: item.id,
            event_id: item.event_id,
            time: item.time,
            activity: item.activity,
        };
        data.schedules.push(item.clone());
        Ok(item)
    }

    fn list_feedback(&mut self) -> Result<Vec<models::Feedback>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut feedback = data.feedback.clone();
        feedback.sort_by_key(|f| std::cmp::Reverse(f.created_at));
        Ok(feedback)
    }

    fn create_feedback(
        &mut self,
        auth_token: &AuthToken,
        comment: String,
        rating: i32,
    ) -> Result<models::Feedback, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let user_name = data.user(auth_token.user_id())?.name.clone();
        let feedback = models::Feedback {
            id: Uuid::new_v4(),
            user_id: auth_token.user_id(),
            name: user_name,
            comment,
            rating,
            created_at: chrono::Utc::now(),
        };
        data.feedback.push(feedback.clone());
        Ok(feedback)
    }

    fn authenticate_user(
        &mut self,
        email: &str,
        password_cleartext: &str,
    ) -> Result<(models::User, SessionToken), StoreError> {
        let user = self.get_user_by_email(email).map_err(|e| match e {
            StoreError::NotExisting => StoreError::InvalidCredentials,
            e => e,
        })?;
        let password_matches = password::verify_password(password_cleartext, &user.password_hash)
            .map_err(|e| StoreError::InvalidDataInDatabase(e.to_string()))?;
        if !password_matches {
            return Err(StoreError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(StoreError::AccountBlocked);
        }
        let session_token = SessionToken::new(user.id);
        Ok((user, session_token))
    }

    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError> {
        let user = self.get_user(session_token.user_id())?;
        if !user.is_active {
            return Err(StoreError::AccountBlocked);
        }
        Ok(AuthToken::create_for_session(user.id, user.role))
    }
}
