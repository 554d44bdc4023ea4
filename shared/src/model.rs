use serde::{Deserialize, Serialize};

use crate::account::{AccountInfo, Insets, StationInfo, Subscription, TripRating, User};
use crate::capabilities::TimerId;
use crate::config::CoreConfig;
use crate::geo::LatLng;
use crate::notifications::ErrorQueue;
use crate::session::{Session, SessionPhase};
use crate::settings::AppSettings;
use crate::trip::ActiveTrip;
use crate::UnixTimeMs;

/// Everything the core knows. Only `App::update` mutates it.
#[derive(Debug, Default)]
pub struct Model {
    pub config: CoreConfig,
    pub session: Session,

    pub user: Option<User>,
    pub stations: Vec<StationInfo>,
    pub account_info: Option<AccountInfo>,
    pub subscription: Option<Subscription>,
    pub current_trip: Option<ActiveTrip>,
    pub trip_rating: TripRating,
    pub selected_station: Option<String>,
    pub safe_insets: Insets,

    pub settings: AppSettings,
    /// `false` until the persisted settings have been read.
    pub settings_loaded: bool,

    pub errors: ErrorQueue,

    next_timer: u64,
}

impl Model {
    pub fn next_timer_id(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    /// Drops everything tied to the logged-in account. Settings, stations and
    /// the pending rating stay.
    pub fn clear_account_state(&mut self) {
        self.account_info = None;
        self.subscription = None;
        self.current_trip = None;
        self.user = None;
        self.selected_station = None;
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccountView {
    pub bonus: f64,
    pub balance: f64,
    pub subscription: Option<Subscription>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TripView {
    pub code: String,
    pub bike_id: String,
    pub start_date: UnixTimeMs,
    pub travelled_distance_km: f64,
    pub speed_kmh: f64,
    pub destination: Option<LatLng>,
    pub distance_left: Option<f64>,
    pub predicted_end_date: Option<UnixTimeMs>,
    pub arrival_time: Option<UnixTimeMs>,
    pub finished: bool,
    pub path: geojson::Geometry,
}

impl From<&ActiveTrip> for TripView {
    fn from(trip: &ActiveTrip) -> Self {
        Self {
            code: trip.code.clone(),
            bike_id: trip.bike_id.clone(),
            start_date: trip.start_date,
            travelled_distance_km: trip.travelled_distance_km,
            speed_kmh: trip.speed,
            destination: trip.destination,
            distance_left: trip.distance_left,
            predicted_end_date: trip.predicted_end_date,
            arrival_time: trip.arrival_time,
            finished: trip.finished,
            path: trip.path_geojson(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub session: SessionPhase,
    pub is_authenticated: bool,
    /// The login dialog is shown only once we know there is no session.
    pub show_login: bool,
    pub user: Option<User>,
    pub stations: Vec<StationInfo>,
    pub account: Option<AccountView>,
    pub trip: Option<TripView>,
    pub trip_rating: TripRating,
    pub selected_station: Option<String>,
    pub safe_insets: Insets,
    /// `None` until loaded from storage.
    pub settings: Option<AppSettings>,
    pub errors: Vec<String>,
}

impl From<&Model> for ViewModel {
    fn from(model: &Model) -> Self {
        let phase = model.session.phase();
        let account = model.account_info.as_ref().map(|info| AccountView {
            bonus: info.bonus,
            balance: info.balance,
            subscription: model
                .subscription
                .clone()
                .or_else(|| info.subscription.clone()),
        });

        Self {
            session: phase,
            is_authenticated: model.session.token().is_some(),
            show_login: phase == SessionPhase::LoggedOut,
            user: model.user.clone(),
            stations: model.stations.clone(),
            account,
            trip: model.current_trip.as_ref().map(TripView::from),
            trip_rating: model.trip_rating.clone(),
            selected_station: model.selected_station.clone(),
            safe_insets: model.safe_insets,
            settings: model.settings_loaded.then_some(model.settings),
            errors: model.errors.iter().map(str::to_owned).collect(),
        }
    }
}
