//! Token lifecycle: login, refresh and logout.
//!
//! `Session` only tracks state; the app turns its transitions into backend,
//! timer and storage requests.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::capabilities::TimerId;
use crate::UnixTimeMs;

/// The shell needs the plain text on the wire; `Debug` stays redacted.
fn expose_on_wire<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Password as typed by the user.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct Password(SecretString);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(SecretString::new(s.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        expose_on_wire(&self.0, serializer)
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Password {}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    password: Password,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: Password) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }

    #[must_use]
    pub fn password(&self) -> Password {
        self.password.clone()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    #[serde(serialize_with = "expose_on_wire")]
    pub access_token: SecretString,
    #[serde(serialize_with = "expose_on_wire")]
    pub refresh_token: SecretString,
    pub expiration: UnixTimeMs,
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expiration: UnixTimeMs,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: SecretString::new(refresh_token.into()),
            expiration,
        }
    }

    /// When the refresh timer should fire for this token.
    #[must_use]
    pub const fn refresh_deadline(&self, lead_ms: u64) -> UnixTimeMs {
        self.expiration.saturating_sub_millis(lead_ms)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.access_token.expose_secret() == other.access_token.expose_secret()
            && self.refresh_token.expose_secret() == other.refresh_token.expose_secret()
            && self.expiration == other.expiration
    }
}

impl Eq for Token {}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing loaded yet.
    #[default]
    Unknown,
    LoggedOut,
    Authenticating,
    Active,
    Refreshing,
}

/// Bumped on every login attempt, token activation and logout. Backend
/// responses carry the generation that issued them so late answers for an old
/// session can be told apart.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Generation(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub generation: Generation,
    /// Timer armed for the previous token, to be cancelled.
    pub replaced_timer: Option<TimerId>,
}

#[derive(Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    credentials: Option<Credentials>,
    token: Option<Token>,
    generation: Generation,
    refresh_timer: Option<TimerId>,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn refresh_timer(&self) -> Option<TimerId> {
        self.refresh_timer
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    #[must_use]
    pub fn is_live_timer(&self, id: TimerId) -> bool {
        self.refresh_timer == Some(id)
    }

    /// No stored credentials: show the login prompt.
    pub fn mark_logged_out(&mut self) {
        self.token = None;
        self.phase = SessionPhase::LoggedOut;
    }

    /// Stores the credentials and returns the generation the login request
    /// belongs to. Answers still in flight for a previous account go stale.
    pub fn begin_login(&mut self, credentials: Credentials) -> Generation {
        self.credentials = Some(credentials);
        self.phase = SessionPhase::Authenticating;
        self.bump();
        self.generation
    }

    /// Installs a fresh token and makes `timer` the only live refresh timer.
    pub fn activate(&mut self, token: Token, timer: TimerId) -> Activation {
        self.token = Some(token);
        self.phase = SessionPhase::Active;
        self.bump();
        let replaced_timer = self.refresh_timer.replace(timer);
        Activation {
            generation: self.generation,
            replaced_timer,
        }
    }

    /// Moves to `Refreshing` and hands back what the refresh request needs.
    /// `None` when there is no token to refresh or a refresh is in flight.
    pub fn begin_refresh(&mut self) -> Option<(Generation, String)> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        let refresh_token = self.token.as_ref()?.refresh_token.expose_secret().clone();
        self.phase = SessionPhase::Refreshing;
        Some((self.generation, refresh_token))
    }

    /// Drops token and credentials (logout or failed login). Returns the
    /// refresh timer that must be cancelled.
    pub fn end(&mut self) -> Option<TimerId> {
        self.token = None;
        self.credentials = None;
        self.phase = SessionPhase::LoggedOut;
        self.bump();
        self.refresh_timer.take()
    }

    fn bump(&mut self) {
        self.generation = Generation(self.generation.0 + 1);
    }
}
