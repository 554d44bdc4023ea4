#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_core::Request;
use shared::capabilities::{
    BackendCall, BackendOperation, BackendOutput, BackendResponse, BackendResult,
    KeyValueOperation, LoginResponse, StoredValue, TimerOperation,
};
use shared::session::{Password, Token};
use shared::{App, Effect, Event, Model, UnixTimeMs};

pub type Tester = AppTester<App, Effect>;

pub const EMAIL: &str = "rider@example.com";
pub const PASSWORD: &str = "correct horse";

/// Key-value requests with values decoded, for comparing in assertions.
#[derive(Debug, PartialEq, Eq)]
pub enum Kv {
    Get(String),
    Set(String, String),
    Delete(String),
    Other,
}

impl Kv {
    pub fn get(key: &str) -> Self {
        Kv::Get(key.to_string())
    }

    pub fn set(key: &str, value: &str) -> Self {
        Kv::Set(key.to_string(), value.to_string())
    }

    pub fn delete(key: &str) -> Self {
        Kv::Delete(key.to_string())
    }
}

#[derive(Default)]
pub struct Effects {
    pub renders: usize,
    pub storage: Vec<Request<KeyValueOperation>>,
    pub backend: Vec<Request<BackendOperation>>,
    pub timer: Vec<Request<TimerOperation>>,
}

impl Effects {
    pub fn backend_ops(&self) -> Vec<&BackendOperation> {
        self.backend.iter().map(|r| &r.operation).collect()
    }

    pub fn storage_ops(&self) -> Vec<Kv> {
        self.storage
            .iter()
            .map(|r| match &r.operation {
                KeyValueOperation::Get { key } => Kv::Get(key.clone()),
                KeyValueOperation::Set { key, value } => {
                    Kv::Set(key.clone(), String::from_utf8_lossy(value).into_owned())
                }
                KeyValueOperation::Delete { key } => Kv::Delete(key.clone()),
                _ => Kv::Other,
            })
            .collect()
    }

    pub fn timer_ops(&self) -> Vec<&TimerOperation> {
        self.timer.iter().map(|r| &r.operation).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.renders == 0 && self.storage.is_empty() && self.backend.is_empty() && self.timer.is_empty()
    }
}

pub fn split(effects: Vec<Effect>) -> Effects {
    let mut out = Effects::default();
    for effect in effects {
        match effect {
            Effect::Render(_) => out.renders += 1,
            Effect::KeyValue(request) => out.storage.push(request),
            Effect::Backend(request) => out.backend.push(request),
            Effect::Timer(request) => out.timer.push(request),
        }
    }
    out
}

pub fn send(app: &Tester, model: &mut Model, event: Event) -> Effects {
    split(app.update(event, model).effects)
}

/// Feeds every event an effect resolution produced back into the app.
pub fn send_all(app: &Tester, model: &mut Model, events: Vec<Event>) -> Effects {
    let mut out = Effects::default();
    for event in events {
        let effects = send(app, model, event);
        out.renders += effects.renders;
        out.storage.extend(effects.storage);
        out.backend.extend(effects.backend);
        out.timer.extend(effects.timer);
    }
    out
}

pub fn token(access: &str, expiration_ms: u64) -> Token {
    Token::new(access, format!("{access}-refresh"), UnixTimeMs(expiration_ms))
}

/// A backend answer for the session generation the model is currently on.
pub fn respond(model: &Model, call: BackendCall, result: BackendResult) -> Event {
    Event::BackendResponded(Box::new(BackendResponse {
        generation: model.session.generation(),
        call,
        result,
    }))
}

pub fn stored(value: Option<&str>) -> StoredValue {
    Ok(value.map(|v| v.as_bytes().to_vec()))
}

pub fn credentials_entered() -> Event {
    Event::CredentialsEntered {
        email: EMAIL.to_string(),
        password: Password::new(PASSWORD),
    }
}

/// Logs in with a token expiring at `expiration_ms` and returns the effects
/// of the activation.
pub fn log_in(app: &Tester, model: &mut Model, expiration_ms: u64) -> Effects {
    send(app, model, credentials_entered());
    let event = respond(
        model,
        BackendCall::Login,
        Ok(BackendOutput::Login(LoginResponse {
            code: 0,
            token: Some(token("first", expiration_ms)),
        })),
    );
    send(app, model, event)
}
