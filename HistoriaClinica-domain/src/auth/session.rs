use std::env;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::logging::{log_session_expired, log_session_refreshed};

pub const DEFAULT_TTL_MINUTES: i64 = 480;
pub const DEFAULT_REFRESH_MINUTES: i64 = 15;

/// Session lifetime settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime of a fresh or refreshed session
    pub ttl: Duration,
    /// Activity closer than this to the expiry slides it forward
    pub refresh_window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
            refresh_window: Duration::minutes(DEFAULT_REFRESH_MINUTES),
        }
    }
}

impl SessionConfig {
    /// Read `HISTORIA_SESSION_TTL_MINUTES` and `HISTORIA_SESSION_REFRESH_MINUTES`
    pub fn from_env() -> Self {
        Self {
            ttl: minutes_setting(
                env::var("HISTORIA_SESSION_TTL_MINUTES").ok(),
                DEFAULT_TTL_MINUTES,
                1,
            ),
            refresh_window: minutes_setting(
                env::var("HISTORIA_SESSION_REFRESH_MINUTES").ok(),
                DEFAULT_REFRESH_MINUTES,
                0,
            ),
        }
    }
}

/// Parse a minutes setting; unparsable or out-of-range values fall back to `default`
fn minutes_setting(raw: Option<String>, default: i64, floor: i64) -> Duration {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .and_then(|minutes| Duration::try_minutes(minutes.max(floor)))
        .unwrap_or_else(|| Duration::minutes(default))
}

/// `now + ttl`, saturating at the latest representable instant
fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// An authenticated user and the window in which the login is valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: UserProfile,
    pub token: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user: UserProfile,
        token: Option<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            user,
            token,
            issued_at: now,
            expires_at: expiry(now, ttl),
        }
    }

    /// Build a session from a login response.
    ///
    /// Token and user may sit at the top level or under `data`. A numeric
    /// `expiresIn` (seconds) shortens the lifetime below `ttl`.
    pub fn from_login_body(body: &Value, email: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        let token = lookup(body, &["token", "accessToken"])
            .and_then(Value::as_str)
            .map(String::from);

        let user = lookup(body, &["user"]);
        let text = |key: &str| {
            user.and_then(|u| u.get(key))
                .and_then(Value::as_str)
                .map(String::from)
        };
        let profile = UserProfile {
            email: text("email").unwrap_or_else(|| email.to_string()),
            name: text("name").or_else(|| text("nombre")),
            role: text("role").or_else(|| text("rol")),
        };

        let ttl = lookup(body, &["expiresIn"])
            .and_then(Value::as_i64)
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .map(|lifetime| lifetime.min(ttl))
            .unwrap_or(ttl);

        Self::new(profile, token, now, ttl)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the session is still valid but ends within `window`
    pub fn needs_refresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        !self.is_expired(now) && self.expires_at - now <= window
    }

    /// A copy whose lifetime restarts at `now`
    pub fn refreshed(&self, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            expires_at: expiry(now, ttl),
            ..self.clone()
        }
    }
}

fn lookup<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        body.get(*key)
            .or_else(|| body.get("data").and_then(|data| data.get(*key)))
    })
}

/// Holds the signed-in session, passed explicitly to whoever needs it
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    config: SessionConfig,
    session: Option<Session>,
}

impl SessionContext {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn sign_in(&mut self, session: Session) {
        debug!(user = %session.user.email, "Session stored");
        self.session = Some(session);
    }

    pub fn sign_out(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// The live session at `now`.
    ///
    /// An expired session is dropped. A session inside its refresh window is
    /// extended, since reaching here counts as activity.
    pub fn current(&mut self, now: DateTime<Utc>) -> Option<&Session> {
        let session = self.session.take()?;

        if session.is_expired(now) {
            log_session_expired(&session.user.email, now);
            return None;
        }

        let session = if session.needs_refresh(now, self.config.refresh_window) {
            let refreshed = session.refreshed(now, self.config.ttl);
            log_session_refreshed(&refreshed.user.email, refreshed.expires_at, now);
            refreshed
        } else {
            session
        };

        self.session = Some(session);
        self.session.as_ref()
    }

    pub fn is_authenticated(&mut self, now: DateTime<Utc>) -> bool {
        self.current(now).is_some()
    }
}
