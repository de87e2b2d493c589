use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// User login attempt
    Login,
    /// Failed login attempt
    FailedLogin,
    /// User logout
    Logout,
    /// Session dropped after its expiry
    SessionExpired,
    /// Session expiry extended by activity
    SessionRefreshed,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::Logout => write!(f, "LOGOUT"),
            AuthEventType::SessionExpired => write!(f, "SESSION_EXPIRED"),
            AuthEventType::SessionRefreshed => write!(f, "SESSION_REFRESHED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// Email of the user, when known
    pub user: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user: user.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: &AuthEvent) {
    let user = event.user.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user,
            status,
            event.timestamp.to_rfc3339(),
            details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user,
            status,
            event.timestamp.to_rfc3339(),
            details
        );
    }
}

pub fn log_successful_login(email: &str, at: DateTime<Utc>) {
    log_auth_event(&AuthEvent::new(AuthEventType::Login, Some(email), true).at(at));
}

pub fn log_failed_login(email: &str, reason: &str, at: DateTime<Utc>) {
    let user = if email.is_empty() { None } else { Some(email) };
    log_auth_event(
        &AuthEvent::new(AuthEventType::FailedLogin, user, false)
            .at(at)
            .with_details(reason),
    );
}

pub fn log_logout(email: &str) {
    log_auth_event(&AuthEvent::new(AuthEventType::Logout, Some(email), true));
}

pub fn log_session_expired(email: &str, at: DateTime<Utc>) {
    log_auth_event(&AuthEvent::new(AuthEventType::SessionExpired, Some(email), false).at(at));
}

pub fn log_session_refreshed(email: &str, expires_at: DateTime<Utc>, at: DateTime<Utc>) {
    log_auth_event(
        &AuthEvent::new(AuthEventType::SessionRefreshed, Some(email), true)
            .at(at)
            .with_details(format!("expires {}", expires_at.to_rfc3339())),
    );
}
