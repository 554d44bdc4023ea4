//! Shared core of the bike-share app.
//!
//! The shell (iOS, Android, web) forwards user actions, position fixes and
//! capability responses as [`Event`]s; the core mutates its [`Model`], asks
//! the shell for side effects through [`Capabilities`] and exposes a
//! [`ViewModel`] for rendering.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod account;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod geo;
pub mod model;
pub mod notifications;
pub mod session;
pub mod settings;
pub mod trip;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::CoreConfig;
pub use event::Event;
pub use model::{Model, ViewModel};
pub use crux_core::{render::Render, App as CruxApp};

/// Explicit timestamp unit: milliseconds since the unix epoch.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Signed distance from `earlier` to `self`. Negative when the clock went
    /// backwards between two samples.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn millis_since(self, earlier: Self) -> f64 {
        self.0 as f64 - earlier.0 as f64
    }

    #[must_use]
    pub const fn saturating_sub_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}
