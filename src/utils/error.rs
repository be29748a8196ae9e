use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum ClientError {
    // Form input rejected before any request is sent
    #[error("{0}")]
    Validation(String),

    // Host unreachable, timeout, connection reset
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // 2xx response whose body is not what the endpoint promises
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    // Non-2xx response carrying a business message
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not signed in")]
    Unauthenticated,
}

// Define a type alias for the result type
pub type ClientResult<T> = Result<T, ClientError>;

pub const NETWORK_FAILURE_MESSAGE: &str = "Could not reach the booking service. Please try again.";
pub const MALFORMED_RESPONSE_MESSAGE: &str = "The booking service returned an unexpected response.";

impl ClientError {
    /// True when the backend itself reported the failure (non-2xx with a message),
    /// as opposed to a transport or decoding problem on our side.
    pub fn is_server_reported(&self) -> bool {
        matches!(self, ClientError::Server { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Text shown to the user in an error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Transport(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            ClientError::Decode(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            ClientError::Storage(_) => "Your session could not be saved.".to_string(),
            ClientError::Config(message) => message.clone(),
            ClientError::Unauthenticated => "Please sign in first.".to_string(),
        }
    }

    /// Picks the first failing field in `field_order` so the message is stable
    /// regardless of hash ordering inside `ValidationErrors`.
    pub fn from_validation(errors: &ValidationErrors, field_order: &[&str]) -> Self {
        let field_errors = errors.field_errors();
        let message = field_order
            .iter()
            .filter_map(|field| field_errors.get(*field))
            .chain(field_errors.values())
            .flat_map(|errors| errors.iter())
            .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Please check the form and try again".to_string());
        ClientError::Validation(message)
    }
}
