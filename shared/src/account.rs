//! Backend-owned records the core mirrors for the UI.

use serde::{Deserialize, Serialize};

use crate::UnixTimeMs;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StationInfo {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub bikes: u32,
    pub docks: u32,
    pub serial_number: String,
    pub asset_status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccountInfo {
    pub bonus: f64,
    pub balance: f64,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub active: bool,
    pub expiration_date: UnixTimeMs,
    pub name: String,
    pub subscription_status: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A finished trip still waiting for the rider's rating.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnratedTrip {
    pub code: String,
    pub bike_id: String,
    pub start_date: UnixTimeMs,
    pub end_date: UnixTimeMs,
    pub trip_points: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TripRating {
    pub current_rating: Option<UnratedTrip>,
}

/// Safe-area insets reported by the shell, in logical pixels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Insets {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}
