use std::sync::Arc;

use timewise_core::{CalendarEvent, Reschedule, Timetable};
use tracing::info;

use crate::StoreError;
use crate::backend::StateBackend;
use crate::state::{AppState, Mark};

/// Current state snapshot plus the backend it is saved to.
///
/// Each mutation computes the next [`AppState`], saves it, and only then
/// swaps the snapshot in. A failed save leaves the previous snapshot in
/// place.
pub struct Store<B: StateBackend> {
    backend: B,
    current: Arc<AppState>,
}

impl<B: StateBackend> Store<B> {
    pub fn open(backend: B) -> Result<Self, StoreError> {
        let state = backend.load()?;
        info!(
            days = state.timetable.len(),
            subjects = state.attendance.len(),
            events = state.events.len(),
            "store opened"
        );
        Ok(Self {
            backend,
            current: Arc::new(state),
        })
    }

    /// Cheap handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.current)
    }

    pub fn state(&self) -> &AppState {
        &self.current
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn commit(&mut self, next: AppState) -> Result<Arc<AppState>, StoreError> {
        self.backend.save(&next)?;
        self.current = Arc::new(next);
        Ok(self.snapshot())
    }

    pub fn set_timetable(&mut self, timetable: Timetable) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.with_timetable(timetable);
        self.commit(next)
    }

    pub fn mark_attendance(&mut self, subject: &str, mark: Mark) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.with_attendance_mark(subject, mark);
        self.commit(next)
    }

    pub fn reset_attendance(&mut self, subject: &str) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.without_attendance(subject);
        self.commit(next)
    }

    pub fn edit_attendance(
        &mut self,
        subject: &str,
        attended: u32,
        missed: u32,
    ) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.with_attendance_edit(subject, attended, missed);
        self.commit(next)
    }

    pub fn sync_attendance(&mut self) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.with_synced_attendance();
        self.commit(next)
    }

    pub fn add_event(&mut self, event: CalendarEvent) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.with_event(event);
        self.commit(next)
    }

    pub fn remove_event(&mut self, id: &str) -> Result<Arc<AppState>, StoreError> {
        let next = self.current.without_event(id);
        self.commit(next)
    }

    /// Apply a reschedule; returns whether anything moved.
    pub fn reschedule_class(&mut self, change: &Reschedule) -> Result<bool, StoreError> {
        let next = self.current.with_rescheduled_class(change);
        if next == *self.current {
            return Ok(false);
        }
        info!(
            subject = %change.subject,
            from = %change.from_day,
            to = %change.to_day,
            "class rescheduled"
        );
        self.commit(next)?;
        Ok(true)
    }
}
