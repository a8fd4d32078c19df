use super::{
    models, schema, EventFilter, EventFlowStore, EventFlowStoreFacade, EventId, RequestId,
    RsvpUpdate, StoreError,
};
use crate::auth_session::SessionToken;
use crate::data_store::auth_token::{AuthToken, GlobalAuthToken, Privilege, Role};
use crate::data_store::models::{RequestStatus, RsvpStatus};
use crate::data_store::password;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .min_idle(Some(2))
                .build(connection_manager)?,
        })
    }
}

impl EventFlowStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn EventFlowStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

impl EventFlowStoreFacade for PgDataStoreFacade {
    fn register_user(&mut self, user: models::NewUser) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;

        // Self-registration always yields a plain user account, whatever the caller put into the
        // record.
        let user = models::NewUser {
            role: Role::User,
            ..user
        };
        Ok(diesel::insert_into(users)
            .values(&user)
            .returning(models::User::as_returning())
            .get_result::<models::User>(&mut self.connection)?)
    }

    fn create_user(
        &mut self,
        _auth_token: &GlobalAuthToken,
        user: models::NewUser,
    ) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;

        Ok(diesel::insert_into(users)
            .values(&user)
            .returning(models::User::as_returning())
            .get_result::<models::User>(&mut self.connection)?)
    }

    fn get_user(&mut self, user_id: super::UserId) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;

        users
            .filter(id.eq(user_id))
            .select(models::User::as_select())
            .first::<models::User>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn get_user_by_email(&mut self, user_email: &str) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;

        users
            .filter(email.eq(user_email))
            .select(models::User::as_select())
            .first::<models::User>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn list_users(&mut self, auth_token: &AuthToken) -> Result<Vec<models::User>, StoreError> {
        use schema::users::dsl::*;
        auth_token.check_privilege(Privilege::ManageUsers)?;

        Ok(users
            .select(models::User::as_select())
            .order_by(created_at.asc())
            .load::<models::User>(&mut self.connection)?)
    }

    fn update_user(
        &mut self,
        auth_token: &AuthToken,
        user_id: super::UserId,
        patch: models::UserPatch,
    ) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;
        auth_token.check_privilege(Privilege::ManageUsers)?;

        if patch.is_empty() {
            return self.get_user(user_id);
        }
        Ok(diesel::update(users)
            .filter(id.eq(user_id))
            .set(patch)
            .returning(models::User::as_returning())
            .get_result::<models::User>(&mut self.connection)?)
    }

    fn get_platform_stats(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<models::PlatformStats, StoreError> {
        auth_token.check_privilege(Privilege::ViewPlatformStats)?;

        self.connection.transaction(|connection| {
            Ok(models::PlatformStats {
                total_users: schema::users::table.count().get_result::<i64>(connection)?,
                total_events: schema::events::table.count().get_result::<i64>(connection)?,
                total_requests: schema::event_requests::table
                    .count()
                    .get_result::<i64>(connection)?,
                pending_requests: schema::event_requests::table
                    .filter(schema::event_requests::status.eq(RequestStatus::Pending))
                    .count()
                    .get_result::<i64>(connection)?,
            })
        })
    }

    fn get_events(
        &mut self,
        filter: EventFilter,
    ) -> Result<Vec<models::EventWithOrganizer>, StoreError> {
        use schema::events::dsl::*;

        let mut query = events.inner_join(schema::users::table).into_boxed();
        if let Some(after) = filter.after {
            query = query.filter(date.ge(after));
        }
        if let Some(before) = filter.before {
            query = query.filter(date.lt(before));
        }
        Ok(query
            .order_by(date.asc())
            .select((models::Event::as_select(), schema::users::name))
            .load::<(models::Event, String)>(&mut self.connection)?
            .into_iter()
            .map(|(event, organizer_name)| models::EventWithOrganizer {
                event,
                organizer_name,
            })
            .collect())
    }

    fn get_event(&mut self, event_id: EventId) -> Result<models::EventWithOrganizer, StoreError> {
        use schema::events::dsl::*;

        let (event, organizer_name) = events
            .inner_join(schema::users::table)
            .filter(id.eq(event_id))
            .select((models::Event::as_select(), schema::users::name))
            .first::<(models::Event, String)>(&mut self.connection)?;
        Ok(models::EventWithOrganizer {
            event,
            organizer_name,
        })
    }

    fn create_event(
        &mut self,
        auth_token: &AuthToken,
        event: models::NewEvent,
    ) -> Result<models::Event, StoreError> {
        use schema::events::dsl::*;
        auth_token.check_privilege(Privilege::CreateEvents)?;

        Ok(diesel::insert_into(events)
            .values(&event)
            .returning(models::Event::as_returning())
            .get_result::<models::Event>(&mut self.connection)?)
    }

    fn update_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
        patch: models::EventPatch,
    ) -> Result<models::Event, StoreError> {
        use schema::events::dsl::*;

        self.connection.transaction(|connection| {
            let event_organizer = events
                .filter(id.eq(event_id))
                .select(organizer)
                .first::<Uuid>(connection)?;
            auth_token.check_event_privilege(event_organizer, Privilege::ManageEvents)?;

            if patch.is_empty() {
                return Ok(events
                    .filter(id.eq(event_id))
                    .select(models::Event::as_select())
                    .first::<models::Event>(connection)?);
            }
            Ok(diesel::update(events)
                .filter(id.eq(event_id))
                .set(patch)
                .returning(models::Event::as_returning())
                .get_result::<models::Event>(connection)?)
        })
    }

    fn delete_event(
        &mut self,
        auth_token: &AuthToken,
        event_id: EventId,
    ) -> Result<(), StoreError> {
        use schema::events::dsl::*;
        auth_token.check_privilege(Privilege::DeleteEvents)?;

        self.connection.transaction(|connection| {
            diesel::delete(schema::guests::table.filter(schema::guests::event_id.eq(event_id)))
                .execute(connection)?;
            diesel::delete(
                schema::schedules::table.filter(schema::schedules::event_id.eq(event_id)),
            )
            .execute(connection)?;
            let count = diesel::delete(events.filter(id.eq(event_id))).execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }
            Ok(())
        })
    }

    fn create_event_request(
        &mut self,
        auth_token: &AuthToken,
        request: models::NewEventRequest,
    ) -> Result<models::EventRequest, StoreError> {
        use schema::event_requests::dsl::*;

        // Requests are always filed in the name of the authenticated user and start out pending.
        let request = models::NewEventRequest {
            user_id: auth_token.user_id(),
            status: RequestStatus::Pending,
            ..request
        };
        Ok(diesel::insert_into(event_requests)
            .values(&request)
            .returning(models::EventRequest::as_returning())
            .get_result::<models::EventRequest>(&mut self.connection)?)
    }

    fn get_own_event_requests(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::EventRequest>, StoreError> {
        use schema::event_requests::dsl::*;

        Ok(event_requests
            .filter(user_id.eq(auth_token.user_id()))
            .select(models::EventRequest::as_select())
            .order_by(created_at.desc())
            .load::<models::EventRequest>(&mut self.connection)?)
    }

    fn list_event_requests(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::EventRequestWithUser>, StoreError> {
        use schema::event_requests::dsl::*;
        auth_token.check_privilege(Privilege::ListEventRequests)?;

        Ok(event_requests
            .inner_join(schema::users::table)
            .select((
                models::EventRequest::as_select(),
                schema::users::name,
                schema::users::email,
            ))
            .order_by(created_at.desc())
            .load::<(models::EventRequest, String, String)>(&mut self.connection)?
            .into_iter()
            .map(|(request, user_name, user_email)| models::EventRequestWithUser {
                request,
                user_name,
                user_email,
            })
            .collect())
    }

    fn approve_event_request(
        &mut self,
        auth_token: &AuthToken,
        request_id: RequestId,
    ) -> Result<(models::EventRequest, models::Event), StoreError> {
        use schema::event_requests::dsl::*;
        auth_token.check_privilege(Privilege::ProcessEventRequests)?;

        self.connection.transaction(|connection| {
            let request = event_requests
                .filter(id.eq(request_id))
                .select(models::EventRequest::as_select())
                .first::<models::EventRequest>(connection)?;
            if request.status != RequestStatus::Pending {
                return Err(StoreError::AlreadyProcessed);
            }

            let event = diesel::insert_into(schema::events::table)
                .values(&event_from_request(&request))
                .returning(models::Event::as_returning())
                .get_result::<models::Event>(connection)?;

            // The requester always becomes an organizer, whatever role they held before
            diesel::update(schema::users::table)
                .filter(schema::users::id.eq(request.user_id))
                .set(schema::users::role.eq(Role::Organizer))
                .execute(connection)?;

            let request = diesel::update(event_requests)
                .filter(id.eq(request_id))
                .set(status.eq(RequestStatus::Approved))
                .returning(models::EventRequest::as_returning())
                .get_result::<models::EventRequest>(connection)?;

            Ok((request, event))
        })
    }

    fn reject_event_request(
        &mut self,
        auth_token: &AuthToken,
        request_id: RequestId,
    ) -> Result<models::EventRequest, StoreError> {
        use schema::event_requests::dsl::*;
        auth_token.check_privilege(Privilege::ProcessEventRequests)?;

        self.connection.transaction(|connection| {
            let current_status = event_requests
                .filter(id.eq(request_id))
                .select(status)
                .first::<RequestStatus>(connection)?;
            if current_status != RequestStatus::Pending {
                return Err(StoreError::AlreadyProcessed);
            }

            Ok(diesel::update(event_requests)
                .filter(id.eq(request_id))
                .set(status.eq(RequestStatus::Rejected))
                .returning(models::EventRequest::as_returning())
                .get_result::<models::EventRequest>(connection)?)
        })
    }

    fn invite_guest(
        &mut self,
        auth_token: &AuthToken,
        guest: models::NewGuest,
    ) -> Result<models::Guest, StoreError> {
        use schema::guests::dsl::*;

        self.connection.transaction(|connection| {
            let event_organizer = schema::events::table
                .filter(schema::events::id.eq(guest.event_id))
                .select(schema::events::organizer)
                .first::<Uuid>(connection)?;
            auth_token.check_event_privilege(event_organizer, Privilege::ManageEvents)?;

            Ok(diesel::insert_into(guests)
                .values(&guest)
                .returning(models::Guest::as_returning())
                .get_result::<models::Guest>(connection)?)
        })
    }

    fn rsvp(
        &mut self,
        auth_token: &AuthToken,
        rsvp: RsvpUpdate,
    ) -> Result<models::Guest, StoreError> {
        use schema::guests::dsl::*;

        self.connection.transaction(|connection| {
            // 404 before FK violation for an unknown event
            schema::events::table
                .filter(schema::events::id.eq(rsvp.event_id))
                .select(schema::events::id)
                .first::<Uuid>(connection)?;

            let user = schema::users::table
                .filter(schema::users::id.eq(auth_token.user_id()))
                .select(models::User::as_select())
                .first::<models::User>(connection)?;
            let new_status = rsvp.rsvp_status.unwrap_or(RsvpStatus::Accepted);
            let effective_email = rsvp.email.clone().unwrap_or_else(|| user.email.clone());

            let existing = guests
                .filter(event_id.eq(rsvp.event_id))
                .filter(user_id.eq(auth_token.user_id()))
                .select(models::Guest::as_select())
                .first::<models::Guest>(connection)
                .optional()?;
            if let Some(existing) = existing {
                return Ok(diesel::update(guests)
                    .filter(id.eq(existing.id))
                    .set((
                        name.eq(rsvp.name.clone().unwrap_or(existing.name)),
                        email.eq(rsvp.email.clone().or(existing.email)),
                        rsvp_status.eq(new_status),
                    ))
                    .returning(models::Guest::as_returning())
                    .get_result::<models::Guest>(connection)?);
            }

            // A pending invitation for the same email address is claimed instead of inserting a
            // second record, which would collide with the per-email uniqueness.
            let invited = guests
                .filter(event_id.eq(rsvp.event_id))
                .filter(email.eq(&effective_email))
                .filter(user_id.is_null())
                .select(models::Guest::as_select())
                .first::<models::Guest>(connection)
                .optional()?;
            if let Some(invited) = invited {
                return Ok(diesel::update(guests)
                    .filter(id.eq(invited.id))
                    .set((
                        user_id.eq(auth_token.user_id()),
                        name.eq(rsvp.name.clone().unwrap_or(invited.name)),
                        rsvp_status.eq(new_status),
                    ))
                    .returning(models::Guest::as_returning())
                    .get_result::<models::Guest>(connection)?);
            }

            Ok(diesel::insert_into(guests)
                .values(&models::NewGuest {
                    id: Uuid::new_v4(),
                    event_id: rsvp.event_id,
                    user_id: Some(auth_token.user_id()),
                    name: rsvp.name.clone().unwrap_or(user.name),
                    email: Some(effective_email),
                    rsvp_status: new_status,
                })
                .returning(models::Guest::as_returning())
                .get_result::<models::Guest>(connection)?)
        })
    }

    fn get_guests_for_event(
        &mut self,
        auth_token: &AuthToken,
        the_event_id: EventId,
    ) -> Result<Vec<models::Guest>, StoreError> {
        use schema::guests::dsl::*;

        self.connection.transaction(|connection| {
            let event_organizer = schema::events::table
                .filter(schema::events::id.eq(the_event_id))
                .select(schema::events::organizer)
                .first::<Uuid>(connection)?;
            auth_token.check_event_privilege(event_organizer, Privilege::ManageEvents)?;

            Ok(guests
                .filter(event_id.eq(the_event_id))
                .select(models::Guest::as_select())
                .order_by(created_at.asc())
                .load::<models::Guest>(connection)?)
        })
    }

    fn get_own_guest_records(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::GuestWithEvent>, StoreError> {
        use schema::guests::dsl::*;

        Ok(guests
            .inner_join(schema::events::table)
            .filter(user_id.eq(auth_token.user_id()))
            .select((models::Guest::as_select(), models::Event::as_select()))
            .order_by(schema::events::date.asc())
            .load::<(models::Guest, models::Event)>(&mut self.connection)?
            .into_iter()
            .map(|(guest, event)| models::GuestWithEvent { guest, event })
            .collect())
    }

    fn withdraw_rsvp(
        &mut self,
        auth_token: &AuthToken,
        the_event_id: EventId,
    ) -> Result<(), StoreError> {
        use schema::guests::dsl::*;

        let count = diesel::delete(
            guests
                .filter(event_id.eq(the_event_id))
                .filter(user_id.eq(auth_token.user_id())),
        )
        .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn get_schedule(
        &mut self,
        the_event_id: EventId,
    ) -> Result<Vec<models::ScheduleItem>, StoreError> {
        use schema::schedules::dsl::*;

        self.connection.transaction(|connection| {
            schema::events::table
                .filter(schema::events::id.eq(the_event_id))
                .select(schema::events::id)
                .first::<Uuid>(connection)?;

            Ok(schedules
                .filter(event_id.eq(the_event_id))
                .select(models::ScheduleItem::as_select())
                .order_by(time.asc())
                .load::<models::ScheduleItem>(connection)?)
        })
    }

    fn create_schedule_item(
        &mut self,
        auth_token: &AuthToken,
        item: models::NewScheduleItem,
    ) -> Result<models::ScheduleItem, StoreError> {
        use schema::schedules::dsl::*;

        self.connection.transaction(|connection| {
            let event_organizer = schema::events::table
                .filter(schema::events::id.eq(item.event_id))
                .select(schema::events::organizer)
                .first::<Uuid>(connection)?;
            auth_token.check_event_privilege(event_organizer, Privilege::ManageEvents)?;

            Ok(diesel::insert_into(schedules)
                .values(&item)
                .returning(models::ScheduleItem::as_returning())
                .get_result::<models::ScheduleItem>(connection)?)
        })
    }

    fn list_feedback(&mut self) -> Result<Vec<models::Feedback>, StoreError> {
        use schema::feedback::dsl::*;

        Ok(feedback
            .select(models::Feedback::as_select())
            .order_by(created_at.desc())
            .load::<models::Feedback>(&mut self.connection)?)
    }

    fn create_feedback(
        &mut self,
        auth_token: &AuthToken,
        comment: String,
        rating: i32,
    ) -> Result<models::Feedback, StoreError> {
        self.connection.transaction(|connection| {
            // The author's name is denormalized into the feedback record, so entries keep their
            // name even if the account is renamed or deleted later.
            let user_name = schema::users::table
                .filter(schema::users::id.eq(auth_token.user_id()))
                .select(schema::users::name)
                .first::<String>(connection)?;

            Ok(diesel::insert_into(schema::feedback::table)
                .values(&models::NewFeedback {
                    id: Uuid::new_v4(),
                    user_id: auth_token.user_id(),
                    name: user_name,
                    comment,
                    rating,
                })
                .returning(models::Feedback::as_returning())
                .get_result::<models::Feedback>(connection)?)
        })
    }

    fn authenticate_user(
        &mut self,
        user_email: &str,
        user_password: &str,
    ) -> Result<(models::User, SessionToken), StoreError> {
        let user = match self.get_user_by_email(user_email) {
            Ok(user) => user,
            Err(StoreError::NotExisting) => return Err(StoreError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        let password_matches = password::verify_password(user_password, &user.password_hash)
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

/// Derive the event record created by approving an event request.
fn event_from_request(request: &models::EventRequest) -> models::NewEvent {
    let description = match &request.requirements {
        Some(requirements) => format!(
            "Event type: {}. Requirements: {}",
            request.event_type, requirements
        ),
        None => format!("Event type: {}", request.event_type),
    };
    models::NewEvent {
        id: Uuid::new_v4(),
        name: request.name.clone(),
        date: request.date,
        location: "To be decided".to_string(),
        description,
        organizer: request.user_id,
    }
}
