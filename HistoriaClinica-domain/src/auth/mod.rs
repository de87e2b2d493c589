//! Authentication for the clinical record client.
//!
//! The backend issues the login; this module turns its response into an explicit
//! [`Session`] with a real expiry, held by a [`SessionContext`] that callers pass
//! around instead of reading ambient state.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use historia_clinica_data::{ClinicalApiTrait, GatewayError};

pub mod logging;
pub mod session;

pub use session::{Session, SessionConfig, SessionContext, UserProfile};

use logging::{log_failed_login, log_logout, log_successful_login};

/// Message shown when the login form is incomplete
pub const MISSING_CREDENTIALS: &str = "Por favor, complete todos los campos";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password left blank
    #[error("Por favor, complete todos los campos")]
    MissingCredentials,

    /// The backend refused the login or could not be reached
    #[error("{0}")]
    Rejected(#[from] GatewayError),
}

/// Login against the backend
pub struct AuthService<A: ClinicalApiTrait> {
    api: A,
    config: SessionConfig,
}

impl<A: ClinicalApiTrait> AuthService<A> {
    pub fn new(api: A, config: SessionConfig) -> Self {
        Self { api, config }
    }

    /// Log in and build a session valid from `now`.
    ///
    /// Blank credentials are refused before any network call.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            log_failed_login(email, MISSING_CREDENTIALS, now);
            return Err(AuthError::MissingCredentials);
        }

        match self.api.login(email, password).await {
            Ok(body) => {
                let session = Session::from_login_body(&body, email, now, self.config.ttl);
                log_successful_login(&session.user.email, now);
                Ok(session)
            }
            Err(e) => {
                log_failed_login(email, &e.to_string(), now);
                Err(AuthError::Rejected(e))
            }
        }
    }

    /// Log in and store the session in `context`
    pub async fn sign_in(
        &self,
        context: &mut SessionContext,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let session = self.login(email, password, now).await?;
        context.sign_in(session);
        Ok(())
    }

    pub fn sign_out(&self, context: &mut SessionContext) {
        if let Some(session) = context.sign_out() {
            log_logout(&session.user.email);
        }
    }
}
