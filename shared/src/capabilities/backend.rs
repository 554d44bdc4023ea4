//! The bike-share backend: auth, account data and the live-update channel.
//!
//! The wire protocol lives in the shell. The core only sees typed requests
//! and typed results.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{AccountInfo, StationInfo, Subscription, UnratedTrip, User};
use crate::session::{Generation, Password, Token};
use crate::trip::ActiveTrip;

/// Which backend call a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendCall {
    Login,
    RefreshToken,
    StartLiveUpdates,
    User,
    Stations,
    AccountInfo,
    Subscriptions,
    ActiveTrip,
    LastUnratedTrip,
}

impl BackendCall {
    /// Shown in the error queue when the call fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            BackendCall::Login => "Login failed",
            BackendCall::RefreshToken => "Your session expired. Please log in again.",
            BackendCall::StartLiveUpdates => "Live updates are unavailable",
            BackendCall::User => "Could not load your profile",
            BackendCall::Stations => "Could not load stations",
            BackendCall::AccountInfo => "Could not load account information",
            BackendCall::Subscriptions => "Could not load your subscription",
            BackendCall::ActiveTrip => "Could not load the current trip",
            BackendCall::LastUnratedTrip => "Could not load your last trip",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendOperation {
    Login { email: String, password: Password },
    RefreshToken { refresh_token: String },
    StartLiveUpdates,
    FetchUser,
    FetchStations,
    FetchAccountInfo,
    FetchSubscriptions,
    FetchActiveTrip,
    FetchLastUnratedTrip,
}

impl BackendOperation {
    /// Everything that is (re)loaded whenever a token becomes active.
    #[must_use]
    pub fn cascade() -> [BackendOperation; 7] {
        [
            BackendOperation::StartLiveUpdates,
            BackendOperation::FetchUser,
            BackendOperation::FetchStations,
            BackendOperation::FetchAccountInfo,
            BackendOperation::FetchSubscriptions,
            BackendOperation::FetchActiveTrip,
            BackendOperation::FetchLastUnratedTrip,
        ]
    }

    #[must_use]
    pub fn call(&self) -> BackendCall {
        match self {
            BackendOperation::Login { .. } => BackendCall::Login,
            BackendOperation::RefreshToken { .. } => BackendCall::RefreshToken,
            BackendOperation::StartLiveUpdates => BackendCall::StartLiveUpdates,
            BackendOperation::FetchUser => BackendCall::User,
            BackendOperation::FetchStations => BackendCall::Stations,
            BackendOperation::FetchAccountInfo => BackendCall::AccountInfo,
            BackendOperation::FetchSubscriptions => BackendCall::Subscriptions,
            BackendOperation::FetchActiveTrip => BackendCall::ActiveTrip,
            BackendOperation::FetchLastUnratedTrip => BackendCall::LastUnratedTrip,
        }
    }
}

/// `code == 0` means success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub code: i32,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BackendOutput {
    Login(LoginResponse),
    Token(Option<Token>),
    LiveUpdatesStarted,
    User(User),
    Stations(Vec<StationInfo>),
    AccountInfo(AccountInfo),
    Subscription(Option<Subscription>),
    ActiveTrip(Option<ActiveTrip>),
    LastUnratedTrip(Option<UnratedTrip>),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("could not decode response: {message}")]
    Decode { message: String },
}

pub type BackendResult = Result<BackendOutput, BackendError>;

impl Operation for BackendOperation {
    type Output = BackendResult;
}

/// A backend result tagged with the call and the session it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendResponse {
    pub generation: Generation,
    pub call: BackendCall,
    pub result: BackendResult,
}

pub struct Backend<Ev> {
    context: CapabilityContext<BackendOperation, Ev>,
}

impl<Ev> Capability<Ev> for Backend<Ev> {
    type Operation = BackendOperation;
    type MappedSelf<MappedEv> = Backend<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Backend::new(self.context.map_event(f))
    }
}

impl<Ev> Backend<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<BackendOperation, Ev>) -> Self {
        Self { context }
    }

    /// Issues `operation` on behalf of session `generation`.
    pub fn request<F>(&self, generation: Generation, operation: BackendOperation, make_event: F)
    where
        F: FnOnce(BackendResponse) -> Ev + Send + 'static,
    {
        let call = operation.call();
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(BackendResponse {
                generation,
                call,
                result,
            }));
        });
    }
}
