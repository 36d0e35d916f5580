use crate::client::{GeminiClient, GenerativeBackend};
use crate::config::AiSettings;

/// Entry point for the UI layer: timetable parsing and chat, each backed by
/// the model fallback chain.
pub struct ScheduleAssistant<B = GeminiClient> {
    pub(crate) backend: B,
    pub(crate) settings: AiSettings,
}

impl ScheduleAssistant<GeminiClient> {
    /// Assistant talking to the real Gemini endpoint at `settings.base_url`.
    pub fn new(settings: AiSettings) -> Self {
        let backend = GeminiClient::new(settings.base_url.clone());
        Self { backend, settings }
    }
}

impl<B: GenerativeBackend> ScheduleAssistant<B> {
    pub fn with_backend(backend: B, settings: AiSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }
}
