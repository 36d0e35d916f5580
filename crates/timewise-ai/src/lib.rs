//! Generative-AI layer: Gemini client, model fallback chain, timetable image
//! parsing, and the chat bridge with its `reschedule_class` tool.

pub mod assistant;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod parse;
pub mod prompt;

pub use assistant::ScheduleAssistant;
pub use chat::{ChatContext, ChatReply, ToolInvocation};
pub use client::{GeminiClient, GenerativeBackend};
pub use config::{AiSettings, ApiVersion, Candidate, GenerationConfig};
pub use error::{AiError, AttemptFailure};
pub use fallback::{FallbackOutcome, run_fallback};
pub use parse::ParsedSchedule;
