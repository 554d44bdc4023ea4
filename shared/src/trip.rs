//! Live trip tracking: turns position fixes into path, distance and speed.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geo::{self, CoordinateError, LatLng};
use crate::UnixTimeMs;

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub latitude: f64,
    pub longitude: f64,
}

/// One position sample as delivered by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub coords: Coords,
    pub timestamp: UnixTimeMs,
}

impl PositionFix {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, timestamp: UnixTimeMs) -> Self {
        Self {
            coords: Coords {
                latitude,
                longitude,
            },
            timestamp,
        }
    }

    pub fn position(&self) -> Result<LatLng, CoordinateError> {
        LatLng::new(self.coords.latitude, self.coords.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lng: f64,
    pub time: UnixTimeMs,
}

impl PathPoint {
    fn position(&self) -> Result<LatLng, CoordinateError> {
        LatLng::new(self.lat, self.lng)
    }
}

/// One in-progress (or just finished) rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTrip {
    pub code: String,
    pub bike_id: String,
    pub start_pos: Option<LatLng>,
    #[serde(default)]
    pub destination: Option<LatLng>,
    #[serde(default)]
    pub travelled_distance_km: f64,
    #[serde(default)]
    pub distance_left: Option<f64>,
    /// km/h between the two most recent fixes.
    #[serde(default)]
    pub speed: f64,
    pub start_date: UnixTimeMs,
    #[serde(default)]
    pub predicted_end_date: Option<UnixTimeMs>,
    #[serde(default)]
    pub arrival_time: Option<UnixTimeMs>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub path_taken: Vec<PathPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    /// No trip, or the trip already finished.
    Ignored,
    /// Coordinates failed validation; nothing was recorded.
    Rejected(CoordinateError),
    /// First point of the path.
    Started,
    Advanced {
        segment_km: f64,
        /// `None` when the elapsed time was zero or negative and the previous
        /// speed was kept.
        speed_kmh: Option<f64>,
    },
}

impl ActiveTrip {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        bike_id: impl Into<String>,
        start_pos: Option<LatLng>,
        start_date: UnixTimeMs,
    ) -> Self {
        Self {
            code: code.into(),
            bike_id: bike_id.into(),
            start_pos,
            destination: None,
            travelled_distance_km: 0.0,
            distance_left: None,
            speed: 0.0,
            start_date,
            predicted_end_date: None,
            arrival_time: None,
            finished: false,
            path_taken: Vec::new(),
        }
    }

    /// Appends the fix and folds the new segment into distance and speed.
    ///
    /// Distance is accumulated against the previously stored point only, so
    /// the cost per fix does not depend on the path length. Timestamps are
    /// taken as delivered: a regression still adds distance but leaves the
    /// speed untouched, as does a repeated timestamp.
    pub fn record_fix(&mut self, fix: &PositionFix, earth_radius_km: f64) -> FixOutcome {
        if self.finished {
            return FixOutcome::Ignored;
        }
        let position = match fix.position() {
            Ok(position) => position,
            Err(e) => return FixOutcome::Rejected(e),
        };

        let previous = self.path_taken.last().copied();
        self.path_taken.push(PathPoint {
            lat: position.lat(),
            lng: position.lng(),
            time: fix.timestamp,
        });

        let Some(previous) = previous else {
            return FixOutcome::Started;
        };

        // stored points were validated on the way in, except ones that came
        // with a backend-provided path
        let segment_km = previous
            .position()
            .map_or(0.0, |from| geo::haversine_km(from, position, earth_radius_km));
        self.travelled_distance_km += segment_km;

        let elapsed_ms = fix.timestamp.millis_since(previous.time);
        let speed_kmh = (elapsed_ms > 0.0).then(|| segment_km / (elapsed_ms / MS_PER_HOUR));
        if let Some(speed) = speed_kmh {
            self.speed = speed;
        }

        FixOutcome::Advanced {
            segment_km,
            speed_kmh,
        }
    }

    pub fn set_destination(&mut self, destination: Option<LatLng>) {
        if destination.is_none() {
            self.distance_left = None;
        }
        self.destination = destination;
    }

    /// Returns `false` if the trip was already finished.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        true
    }

    /// Great-circle length of the stored path. Points that fail validation
    /// contribute nothing, as in [`ActiveTrip::record_fix`].
    #[must_use]
    pub fn path_distance_km(&self, earth_radius_km: f64) -> f64 {
        self.path_taken
            .windows(2)
            .filter_map(|w| {
                let from = w[0].position().ok()?;
                let to = w[1].position().ok()?;
                Some(geo::haversine_km(from, to, earth_radius_km))
            })
            .sum()
    }

    /// Carries locally derived telemetry over from `local` when the backend
    /// re-delivers the same trip. Whichever path is kept, the distance is the
    /// length of that path.
    pub fn keep_telemetry_from(&mut self, local: Self, earth_radius_km: f64) {
        if local.path_taken.len() >= self.path_taken.len() {
            self.path_taken = local.path_taken;
            self.travelled_distance_km = local.travelled_distance_km;
        } else {
            self.travelled_distance_km = self.path_distance_km(earth_radius_km);
        }
        self.speed = local.speed;
        self.destination = self.destination.or(local.destination);
        self.distance_left = self.distance_left.or(local.distance_left);
        self.finished |= local.finished;
    }

    #[must_use]
    pub fn path_geojson(&self) -> geojson::Geometry {
        geo::line_string(self.path_taken.iter().map(|p| (p.lat, p.lng)))
    }
}

/// Feeds one fix into whatever trip is current.
pub fn track_fix(
    trip: &mut Option<ActiveTrip>,
    fix: &PositionFix,
    earth_radius_km: f64,
) -> FixOutcome {
    let Some(trip) = trip.as_mut() else {
        return FixOutcome::Ignored;
    };

    let outcome = trip.record_fix(fix, earth_radius_km);
    match outcome {
        FixOutcome::Ignored => {
            debug!(trip = %trip.code, "fix after trip finished; ignored");
        }
        FixOutcome::Rejected(e) => {
            warn!(trip = %trip.code, error = %e, "dropping invalid position fix");
        }
        FixOutcome::Advanced {
            speed_kmh: None, ..
        } => {
            debug!(
                trip = %trip.code,
                timestamp = fix.timestamp.as_millis(),
                "non-increasing fix timestamp; speed unchanged"
            );
        }
        FixOutcome::Started | FixOutcome::Advanced { .. } => {}
    }
    outcome
}

/// Folds a trip delivered by the backend into the locally tracked one.
/// The same trip code keeps local telemetry; anything else replaces it with
/// its distance taken from its own path.
pub fn reconcile(
    local: Option<ActiveTrip>,
    incoming: Option<ActiveTrip>,
    earth_radius_km: f64,
) -> Option<ActiveTrip> {
    let mut incoming = incoming?;
    match local {
        Some(local) if local.code == incoming.code => {
            incoming.keep_telemetry_from(local, earth_radius_km);
        }
        _ => incoming.travelled_distance_km = incoming.path_distance_km(earth_radius_km),
    }
    Some(incoming)
}
