//! Application state: the parsed timetable, attendance counts, and calendar
//! events, persisted as a single JSON document.

mod backend;
mod error;
mod state;
mod store;

pub use backend::{JsonFileBackend, MemoryBackend, STORAGE_FILE, StateBackend};
pub use error::StoreError;
pub use state::{AppState, Mark};
pub use store::Store;
