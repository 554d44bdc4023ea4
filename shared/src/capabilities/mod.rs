mod backend;
mod storage;
mod timer;

pub use self::backend::{
    Backend, BackendCall, BackendError, BackendOperation, BackendOutput, BackendResponse,
    BackendResult, LoginResponse,
};
pub use self::storage::{encode, KvCapability, StorageKey, StoredValue};
pub use self::timer::{Deadline, Timer, TimerId, TimerOperation, TimerOutput};

// Crux's built-in Render capability covers view updates as-is.
pub use crux_core::render::Render;
pub use crux_kv::error::KeyValueError;
pub use crux_kv::{KeyValue, KeyValueOperation};

// `App` is named by the code the Effect derive generates.
use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub storage: KeyValue<Event>,
    pub backend: Backend<Event>,
    pub timer: Timer<Event>,
}
