use crate::cli::CliAuthTokenKey;
use crate::data_store::{StoreError, UserId};
use diesel::deserialize::FromSql;
use diesel::query_builder::bind_collector::RawBytesBindCollector;
use diesel::serialize::ToSql;
use diesel::{AsExpression, FromSqlRow};
use std::fmt::{Display, Formatter};

pub struct EnumMemberNotExistingError {
    pub member_value: i32,
    pub enum_name: &'static str,
}

impl Display for EnumMemberNotExistingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is not a valid value for {} enum",
            self.member_value, self.enum_name
        )
    }
}

/// Request-scoped identity context, authorizing access to the data_store.
///
/// The AuthToken holds the id and [Role] of the authenticated user account. This structure is our
/// main protection against accidental unauthorized-access bugs: all protected data_store access
/// functions require an AuthToken and check it for the required [Privilege] (or event ownership).
/// An AuthToken can only be created by
/// [crate::data_store::EventFlowStoreFacade::get_auth_token_for_session], based on the verified
/// session token of a client.
pub struct AuthToken {
    user_id: UserId,
    role: Role,
}

impl AuthToken {
    /// Create a new AuthToken for a client session.
    ///
    /// This function must only be used by implementations of
    /// [crate::data_store::EventFlowStoreFacade::get_auth_token_for_session] after resolving the
    /// client's verified session token to an existing user account!
    pub(super) fn create_for_session(user_id: UserId, role: Role) -> Self {
        AuthToken { user_id, role }
    }

    /// The id of the authenticated user account.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Check if the AuthToken authorizes for the given `privilege`.
    ///
    /// The actual authorization check is delegated to [Privilege::qualifying_roles], by checking
    /// if the token's role is contained in the privilege's qualifying roles.
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        privilege.qualifying_roles().contains(&self.role)
    }

    /// Check if the AuthToken authorizes for the given `privilege`. If not, return an appropriate
    /// PermissionDenied error.
    pub fn check_privilege(&self, privilege: Privilege) -> Result<(), StoreError> {
        if self.has_privilege(privilege) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                required_privilege: privilege,
            })
        }
    }

    /// Check authorization for an action on a specific event, which is additionally permitted to
    /// the event's organizer.
    ///
    /// The check passes if the token's user is the given `event_organizer` or if the token
    /// qualifies for `privilege` by role (typically admin-only).
    pub fn check_event_privilege(
        &self,
        event_organizer: UserId,
        privilege: Privilege,
    ) -> Result<(), StoreError> {
        if self.user_id == event_organizer {
            return Ok(());
        }
        self.check_privilege(privilege)
    }
}

/// Authorization token for data_store actions that are not bound to a client session, i.e. command
/// line administration.
///
/// A GlobalAuthToken can only be created via the [CliAuthTokenKey], which is not constructible in
/// the context of the web server.
pub struct GlobalAuthToken {
    _private: (),
}

impl GlobalAuthToken {
    pub fn create_for_cli(_key: &CliAuthTokenKey) -> Self {
        GlobalAuthToken { _private: () }
    }
}

/// Account roles of registered users.
///
/// The roles form a flat permission set, not a hierarchy: each [Privilege] names the exact roles
/// that qualify for it.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, FromSqlRow, AsExpression)]
#[diesel(sql_type = diesel::sql_types::Integer)]
#[repr(i32)]
pub enum Role {
    User = 1,
    Organizer = 2,
    Admin = 3,
}

impl TryFrom<i32> for Role {
    type Error = EnumMemberNotExistingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::User),
            2 => Ok(Role::Organizer),
            3 => Ok(Role::Admin),
            value => Err(EnumMemberNotExistingError {
                member_value: value,
                enum_name: "Role",
            }),
        }
    }
}

impl From<Role> for i32 {
    fn from(value: Role) -> Self {
        value as i32
    }
}

impl From<Role> for eventflow_api_types::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::User => eventflow_api_types::Role::User,
            Role::Organizer => eventflow_api_types::Role::Organizer,
            Role::Admin => eventflow_api_types::Role::Admin,
        }
    }
}

impl From<eventflow_api_types::Role> for Role {
    fn from(value: eventflow_api_types::Role) -> Self {
        match value {
            eventflow_api_types::Role::User => Role::User,
            eventflow_api_types::Role::Organizer => Role::Organizer,
            eventflow_api_types::Role::Admin => Role::Admin,
        }
    }
}

impl Role {
    pub fn name(&self) -> &str {
        match self {
            Role::User => "User",
            Role::Organizer => "Organizer",
            Role::Admin => "Admin",
        }
    }
}

impl<DB> ToSql<diesel::sql_types::Integer, DB> for Role
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

impl<DB> FromSql<diesel::sql_types::Integer, DB> for Role
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

/// Enum of available authorization privileges.
///
/// Each protected data_store action and web endpoint typically requires a single privilege.
#[derive(Debug, Clone, Copy)]
pub enum Privilege {
    ManageUsers,
    ViewPlatformStats,
    CreateEvents,
    ManageEvents,
    DeleteEvents,
    ListEventRequests,
    ProcessEventRequests,
}

impl Privilege {
    /// Get the list of user [Role]s that qualify for this privilege. Each returned role is
    /// individually sufficient for the privilege.
    ///
    /// This function is our source of truth for authorization!
    /// Note that [Privilege::ManageEvents] is additionally granted to the organizer of the
    /// specific event via [AuthToken::check_event_privilege].
    pub fn qualifying_roles(&self) -> &'static [Role] {
        match self {
            Privilege::ManageUsers => &[Role::Admin],
            Privilege::ViewPlatformStats => &[Role::Admin],
            Privilege::CreateEvents => &[Role::Admin],
            Privilege::ManageEvents => &[Role::Admin],
            Privilege::DeleteEvents => &[Role::Admin],
            Privilege::ListEventRequests => &[Role::Admin],
            Privilege::ProcessEventRequests => &[Role::Admin],
        }
    }
}
