use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};

/// Get the database URL from the environment variable.
pub fn get_database_url_from_env() -> Result<String, SetupError> {
    env::var("DATABASE_URL").map_err(|e| SetupError::from_env_error(e, "DATABASE_URL"))
}

/// Get the cryptographic application secret for signing session tokens from the environment
/// variable.
pub fn get_secret_from_env() -> Result<String, SetupError> {
    env::var("SECRET").map_err(|e| SetupError::from_env_error(e, "SECRET"))
}

/// Get the web server TCP listening port from the environment variable
pub fn get_listen_port_from_env() -> Result<u16, SetupError> {
    env::var("LISTEN_PORT")
        .map_err(|e| SetupError::from_env_error(e, "LISTEN_PORT"))
        .and_then(|v| {
            v.parse().map_err(|_| SetupError::EnvVariableInvalid {
                variable_name: "LISTEN_PORT",
                problem: "Not a valid uint16",
            })
        })
}

/// Get the web server TCP listening interface address from the environment variable
pub fn get_listen_address_from_env() -> Result<String, SetupError> {
    env::var("LISTEN_ADDRESS").map_err(|e| SetupError::from_env_error(e, "LISTEN_ADDRESS"))
}

/// Get the frontend origin which is allowed for credentialed cross-origin requests.
pub fn get_frontend_origin_from_env() -> Result<String, SetupError> {
    env::var("FRONTEND_URL").map_err(|e| SetupError::from_env_error(e, "FRONTEND_URL"))
}

/// Get the admin seed account credentials from the environment variables, if both are set.
pub fn get_admin_seed_from_env() -> Option<(String, String)> {
    match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
        (Ok(email), Ok(password)) => Some((email, password)),
        _ => None,
    }
}

/// Get the outbound mail account credentials from the environment variables, if both are set.
///
/// Mail delivery itself is handled by an external system; the credentials only control whether
/// invitation mails are announced at all.
pub fn get_mail_credentials_from_env() -> Option<(String, String)> {
    match (env::var("EMAIL_USER"), env::var("EMAIL_PASS")) {
        (Ok(user), Ok(pass)) => Some((user, pass)),
        _ => None,
    }
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}
