use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Could not reach server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid endpoint '{0}'")]
    Endpoint(String),
}

impl ApiError {
    /// HTTP status of a failed response, `None` for transport/decode failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Text for the user: the server's message for a failed response, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in, run `tapeat login` first")]
    NoSession,
    #[error("Session expired, please log in again")]
    Expired,
    #[error("Malformed session token: {0}")]
    MalformedToken(String),
    #[error("Logged in as {found}, but this command needs a {expected} session")]
    RoleMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("Unknown year of study '{0}'")]
    InvalidYear(String),
    #[error("Deletion cancelled")]
    Cancelled,
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavigationError {
    #[error("Unknown section '{0}'")]
    UnknownSection(String),
    #[error("Unknown route '{0}'")]
    UnknownRoute(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,
    #[error("Unknown export format '{0}'")]
    UnknownFormat(String),
    #[error("Could not write export: {0}")]
    Io(#[from] std::io::Error),
}
