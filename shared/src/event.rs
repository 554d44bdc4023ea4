use serde::{Deserialize, Serialize};

use crate::account::Insets;
use crate::capabilities::{BackendResponse, StorageKey, StoredValue, TimerOutput};
use crate::config::CoreConfig;
use crate::geo::LatLng;
use crate::session::Password;
use crate::settings::AppSettings;
use crate::trip::PositionFix;

// Large variants are boxed to keep the enum small.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    Started {
        config: Option<CoreConfig>,
    },

    // Session
    CredentialsEntered {
        email: String,
        password: Password,
    },
    RefreshRequested,
    LogOutRequested,

    // Trip
    PositionFixReceived(PositionFix),
    TripDestinationChanged {
        destination: Option<LatLng>,
    },
    TripFinished,
    TripRatingResolved,

    // Preferences & UI state
    SettingsChanged(AppSettings),
    StationSelected {
        code: Option<String>,
    },
    SafeInsetsChanged(Insets),

    // Error queue
    ErrorReported {
        message: String,
    },
    ErrorDismissed {
        message: String,
    },

    // Capability responses
    #[serde(skip)]
    StoredEmailLoaded(StoredValue),
    #[serde(skip)]
    StoredPasswordLoaded {
        email: String,
        result: StoredValue,
    },
    #[serde(skip)]
    StoredSettingsLoaded(StoredValue),
    #[serde(skip)]
    StorageWritten {
        key: StorageKey,
        result: StoredValue,
    },
    #[serde(skip)]
    BackendResponded(Box<BackendResponse>),
    #[serde(skip)]
    RefreshTimerFired(TimerOutput),
    #[serde(skip)]
    ErrorExpired {
        message: String,
        stamp: u64,
    },
}
