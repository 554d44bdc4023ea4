use tracing::{debug, info, warn};

use crate::capabilities::{
    encode, BackendCall, BackendOperation, BackendOutput, BackendResponse, BackendResult,
    Capabilities, Deadline, LoginResponse, StorageKey, StoredValue, TimerOutput,
};
use crate::event::Event;
use crate::model::{Model, ViewModel};
use crate::session::{Credentials, Password, SessionPhase, Token};
use crate::settings::AppSettings;
use crate::trip::{self, FixOutcome};

#[derive(Default)]
pub struct App;

impl App {
    fn read(caps: &Capabilities, key: StorageKey, make_event: fn(StoredValue) -> Event) {
        caps.storage.get(key.raw(), make_event);
    }

    fn write(caps: &Capabilities, key: StorageKey, value: impl Into<String>) {
        caps.storage.set(key.raw(), encode(value), move |result| {
            Event::StorageWritten { key, result }
        });
    }

    fn delete(caps: &Capabilities, key: StorageKey) {
        caps.storage.delete(key.raw(), move |result| Event::StorageWritten {
            key,
            result,
        });
    }

    fn call_backend(model: &Model, caps: &Capabilities, operation: BackendOperation) {
        caps.backend.request(
            model.session.generation(),
            operation,
            |response| Event::BackendResponded(Box::new(response)),
        );
    }

    fn start_login(model: &mut Model, caps: &Capabilities, credentials: Credentials) {
        let operation = BackendOperation::Login {
            email: credentials.email.clone(),
            password: credentials.password(),
        };
        let generation = model.session.begin_login(credentials);
        info!(generation = generation.0, "logging in");
        Self::call_backend(model, caps, operation);
    }

    /// A token just became valid: reload everything that depends on it and
    /// re-arm the refresh timer.
    fn activate(model: &mut Model, caps: &Capabilities, token: Token) {
        let refresh_at = token.refresh_deadline(model.config.token_refresh_lead_ms);
        let timer = model.next_timer_id();
        let activation = model.session.activate(token, timer);

        if let Some(previous) = activation.replaced_timer {
            caps.timer.cancel(previous);
        }

        info!(
            generation = activation.generation.0,
            refresh_at = refresh_at.as_millis(),
            "session active"
        );

        for operation in BackendOperation::cascade() {
            Self::call_backend(model, caps, operation);
        }

        caps.timer.start(
            timer,
            Deadline::At {
                unix_ms: refresh_at,
            },
            Event::RefreshTimerFired,
        );
    }

    fn start_refresh(model: &mut Model, caps: &Capabilities) {
        match model.session.begin_refresh() {
            Some((generation, refresh_token)) => {
                info!(generation = generation.0, "refreshing token");
                Self::call_backend(
                    model,
                    caps,
                    BackendOperation::RefreshToken { refresh_token },
                );
            }
            None => debug!(phase = ?model.session.phase(), "refresh skipped"),
        }
    }

    fn forget_credentials(caps: &Capabilities) {
        Self::delete(caps, StorageKey::Email);
        Self::delete(caps, StorageKey::Password);
    }

    fn log_out(model: &mut Model, caps: &Capabilities) {
        if let Some(timer) = model.session.end() {
            caps.timer.cancel(timer);
        }
        Self::forget_credentials(caps);
        model.clear_account_state();
        info!("logged out");
    }

    fn finish_login(model: &mut Model, caps: &Capabilities, result: BackendResult) {
        match result {
            Ok(BackendOutput::Login(LoginResponse {
                code: 0,
                token: Some(token),
            })) => {
                if let Some(credentials) = model.session.credentials() {
                    Self::write(caps, StorageKey::Email, credentials.email.clone());
                    Self::write(caps, StorageKey::Password, credentials.password().expose());
                }
                Self::activate(model, caps, token);
            }
            other => {
                match other {
                    Ok(BackendOutput::Login(LoginResponse { code, .. })) => {
                        warn!(code, "login rejected");
                    }
                    Ok(output) => warn!(?output, "unexpected login output"),
                    Err(e) => warn!(error = %e, "login request failed"),
                }
                if let Some(timer) = model.session.end() {
                    caps.timer.cancel(timer);
                }
                Self::forget_credentials(caps);
            }
        }
    }

    fn finish_refresh(model: &mut Model, caps: &Capabilities, result: BackendResult) {
        match result {
            Ok(BackendOutput::Token(Some(token))) => Self::activate(model, caps, token),
            other => {
                match other {
                    Ok(output) => warn!(?output, "token refresh returned no token"),
                    Err(e) => warn!(error = %e, "token refresh failed"),
                }
                Self::report_error(model, caps, BackendCall::RefreshToken.failure_message());
                Self::log_out(model, caps);
            }
        }
    }

    fn apply_backend_output(model: &mut Model, call: BackendCall, output: BackendOutput) {
        match output {
            BackendOutput::LiveUpdatesStarted => debug!("live updates started"),
            BackendOutput::User(user) => model.user = Some(user),
            BackendOutput::Stations(stations) => {
                debug!(count = stations.len(), "stations updated");
                model.stations = stations;
            }
            BackendOutput::AccountInfo(info) => model.account_info = Some(info),
            BackendOutput::Subscription(subscription) => model.subscription = subscription,
            BackendOutput::ActiveTrip(incoming) => {
                model.current_trip = trip::reconcile(
                    model.current_trip.take(),
                    incoming,
                    model.config.earth_radius_km,
                );
            }
            BackendOutput::LastUnratedTrip(trip) => model.trip_rating.current_rating = trip,
            output @ (BackendOutput::Login(_) | BackendOutput::Token(_)) => {
                warn!(?call, ?output, "unexpected backend output");
            }
        }
    }

    fn handle_backend(model: &mut Model, caps: &Capabilities, response: BackendResponse) {
        let BackendResponse {
            generation,
            call,
            result,
        } = response;

        if !model.session.is_current(generation) {
            debug!(
                ?call,
                stale = generation.0,
                current = model.session.generation().0,
                "discarding response for superseded session"
            );
            return;
        }

        match call {
            BackendCall::Login => Self::finish_login(model, caps, result),
            BackendCall::RefreshToken => Self::finish_refresh(model, caps, result),
            _ => match result {
                Ok(output) => Self::apply_backend_output(model, call, output),
                Err(e) => {
                    warn!(?call, error = %e, "backend call failed");
                    Self::report_error(model, caps, call.failure_message());
                }
            },
        }
    }

    fn report_error(model: &mut Model, caps: &Capabilities, message: impl Into<String>) {
        let message = message.into();
        let stamp = model.errors.add(message.clone());

        let timer = model.next_timer_id();
        caps.timer.start(
            timer,
            Deadline::After {
                millis: model.config.error_display_ms,
            },
            move |_| Event::ErrorExpired { message, stamp },
        );
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::Started { config } => {
                if let Some(config) = config {
                    match config.validate() {
                        Ok(()) => model.config = config,
                        Err(e) => warn!(error = %e, "ignoring invalid config"),
                    }
                }
                model.settings = AppSettings {
                    distance_lock: model.config.default_distance_lock,
                };
                Self::read(caps, StorageKey::Email, Event::StoredEmailLoaded);
                Self::read(caps, StorageKey::DistanceLock, Event::StoredSettingsLoaded);
            }

            Event::StoredEmailLoaded(result) => {
                if model.session.phase() != SessionPhase::Unknown {
                    return;
                }
                match StorageKey::Email.decode(result) {
                    Some(email) => caps.storage.get(StorageKey::Password.raw(), move |result| {
                        Event::StoredPasswordLoaded { email, result }
                    }),
                    None => {
                        model.session.mark_logged_out();
                        caps.render.render();
                    }
                }
            }

            Event::StoredPasswordLoaded { email, result } => {
                if model.session.phase() != SessionPhase::Unknown {
                    return;
                }
                match StorageKey::Password.decode(result) {
                    Some(password) => Self::start_login(
                        model,
                        caps,
                        Credentials::new(email, Password::new(password)),
                    ),
                    None => model.session.mark_logged_out(),
                }
                caps.render.render();
            }

            Event::StoredSettingsLoaded(result) => {
                if !model.settings_loaded {
                    let stored = StorageKey::DistanceLock.decode(result);
                    let defaults = AppSettings {
                        distance_lock: model.config.default_distance_lock,
                    };
                    model.settings = AppSettings::from_stored(stored.as_deref(), defaults);
                    model.settings_loaded = true;
                }
                caps.render.render();
            }

            Event::CredentialsEntered { email, password } => {
                Self::start_login(model, caps, Credentials::new(email, password));
                caps.render.render();
            }

            Event::RefreshRequested => {
                Self::start_refresh(model, caps);
                caps.render.render();
            }

            Event::RefreshTimerFired(output) => match output {
                TimerOutput::Fired { id } if model.session.is_live_timer(id) => {
                    Self::start_refresh(model, caps);
                    caps.render.render();
                }
                TimerOutput::Fired { id } | TimerOutput::Cancelled { id } => {
                    debug!(timer = id.0, "ignoring superseded refresh timer");
                }
            },

            Event::LogOutRequested => {
                Self::log_out(model, caps);
                caps.render.render();
            }

            Event::BackendResponded(response) => {
                Self::handle_backend(model, caps, *response);
                caps.render.render();
            }

            Event::PositionFixReceived(fix) => {
                let outcome =
                    trip::track_fix(&mut model.current_trip, &fix, model.config.earth_radius_km);
                if matches!(outcome, FixOutcome::Started | FixOutcome::Advanced { .. }) {
                    caps.render.render();
                }
            }

            Event::TripDestinationChanged { destination } => {
                if let Some(trip) = model.current_trip.as_mut() {
                    trip.set_destination(destination);
                    caps.render.render();
                }
            }

            Event::TripFinished => {
                if let Some(trip) = model.current_trip.as_mut() {
                    if trip.finish() {
                        info!(trip = %trip.code, km = trip.travelled_distance_km, "trip finished");
                        caps.render.render();
                    }
                }
            }

            Event::TripRatingResolved => {
                model.trip_rating.current_rating = None;
                caps.render.render();
            }

            Event::SettingsChanged(settings) => {
                model.settings = settings;
                model.settings_loaded = true;
                Self::write(caps, StorageKey::DistanceLock, settings.distance_lock_value());
                caps.render.render();
            }

            Event::StationSelected { code } => {
                model.selected_station = code;
                caps.render.render();
            }

            Event::SafeInsetsChanged(insets) => {
                model.safe_insets = insets;
                caps.render.render();
            }

            Event::ErrorReported { message } => {
                Self::report_error(model, caps, message);
                caps.render.render();
            }

            Event::StorageWritten { key, result } => {
                if let Err(e) = result {
                    warn!(key = key.as_str(), error = %e, "storage write failed");
                }
            }

            Event::ErrorDismissed { message } => {
                if model.errors.remove(&message) {
                    caps.render.render();
                }
            }

            Event::ErrorExpired { message, stamp } => {
                if model.errors.expire(&message, stamp) {
                    caps.render.render();
                } else {
                    debug!(%message, "expiry superseded by a later report");
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from(model)
    }
}
