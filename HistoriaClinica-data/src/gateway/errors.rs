use thiserror::Error;

/// Result alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error type for backend calls
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Non-2xx response, or a 2xx body reporting `success: false`.
    /// The message is the backend's `error` field when it sent one.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response
    #[error("{context}: no se pudo conectar con el servidor")]
    Network {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// A successful response whose body could not be interpreted
    #[error("{details}")]
    InvalidResponse {
        context: &'static str,
        details: String,
    },

    /// Client construction failed
    #[error("Error de configuración: {0}")]
    Config(String),
}

impl GatewayError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend could not be reached at all
    pub fn is_network(&self) -> bool {
        matches!(self, GatewayError::Network { .. })
    }
}
