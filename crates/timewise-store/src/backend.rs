//! Where [`AppState`] lives between runs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::StoreError;
use crate::state::AppState;

/// Default file name for the persisted state.
pub const STORAGE_FILE: &str = "timewise-storage.json";

const STATE_VERSION: u32 = 0;

pub trait StateBackend: Send + Sync {
    /// The stored state, or the empty default if nothing has been saved.
    fn load(&self) -> Result<AppState, StoreError>;
    fn save(&self, state: &AppState) -> Result<(), StoreError>;
}

#[derive(Serialize, Deserialize)]
struct Envelope<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

/// JSON document on disk, replaced atomically on every save.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateBackend for JsonFileBackend {
    fn load(&self) -> Result<AppState, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no saved state, starting empty");
                return Ok(AppState::default());
            }
            Err(e) => return Err(e.into()),
        };
        let envelope: Envelope<AppState> = serde_json::from_str(&text)?;
        debug!(
            path = %self.path.display(),
            version = envelope.version,
            days = envelope.state.timetable.len(),
            "loaded state"
        );
        Ok(envelope.state)
    }

    fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let envelope = Envelope {
            state,
            version: STATE_VERSION,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &envelope)?;
        tmp.flush()?;
        tmp.persist(&self.path)?;
        debug!(path = %self.path.display(), "saved state");
        Ok(())
    }
}

/// Process-local backend; nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<AppState>>,
}

impl MemoryBackend {
    pub fn with_state(state: AppState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
        }
    }

    /// The last saved state, if any save happened.
    pub fn saved(&self) -> Option<AppState> {
        self.saved.lock().ok().and_then(|s| s.clone())
    }
}

impl StateBackend for MemoryBackend {
    fn load(&self) -> Result<AppState, StoreError> {
        let slot = self.saved.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slot.clone().unwrap_or_default())
    }

    fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let mut slot = self.saved.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(state.clone());
        Ok(())
    }
}
