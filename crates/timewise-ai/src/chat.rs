//! Conversational bridge with a single declared tool, `reschedule_class`.
//!
//! Function calls the model emits are relayed to the caller unmodified;
//! applying them to the timetable is the caller's job.

use serde::Serialize;
use serde_json::Value;
use timewise_core::{AttendanceRecord, Reschedule, Timetable};
use tracing::info;

use crate::assistant::ScheduleAssistant;
use crate::client::{Content, FunctionCall, GenerateContentResponse, GenerateRequest, GenerativeBackend, Part};
use crate::error::AiError;
use crate::fallback::run_fallback;
use crate::prompt::{CHAT_ACKNOWLEDGEMENT, CHAT_PREAMBLE, RESCHEDULE_TOOL, chat_turn, reschedule_tool};

/// What the model sees of the user's state: a trimmed timetable and the
/// attendance counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatContext {
    pub timetable: Vec<ContextDay>,
    pub attendance: Vec<ContextAttendance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextDay {
    pub day: String,
    pub periods: Vec<ContextPeriod>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPeriod {
    pub subject: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextAttendance {
    pub subject: String,
    pub attended: u32,
    pub missed: u32,
}

impl ChatContext {
    pub fn from_state(timetable: &Timetable, attendance: &[AttendanceRecord]) -> Self {
        Self {
            timetable: timetable
                .iter()
                .map(|d| ContextDay {
                    day: d.day.to_string(),
                    periods: d
                        .periods
                        .iter()
                        .map(|p| ContextPeriod {
                            subject: p.subject.clone(),
                            start_time: p.start_time.clone(),
                            end_time: p.end_time.clone(),
                            room: p.room.clone(),
                        })
                        .collect(),
                })
                .collect(),
            attendance: attendance
                .iter()
                .map(|a| ContextAttendance {
                    subject: a.subject.clone(),
                    attended: a.attended,
                    missed: a.missed,
                })
                .collect(),
        }
    }
}

/// A function call requested by the model, as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Value,
}

impl From<FunctionCall> for ToolInvocation {
    fn from(call: FunctionCall) -> Self {
        Self {
            name: call.name,
            args: call.args,
        }
    }
}

impl ToolInvocation {
    /// Decode a `reschedule_class` call; `None` for other tools or
    /// arguments missing a field.
    pub fn as_reschedule(&self) -> Option<Reschedule> {
        if self.name != RESCHEDULE_TOOL {
            return None;
        }
        serde_json::from_value(self.args.clone()).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub reply: String,
    pub tool_invocations: Vec<ToolInvocation>,
}

impl<B: GenerativeBackend> ScheduleAssistant<B> {
    /// Ask the assistant a question about the user's schedule.
    pub async fn chat(&self, query: &str, context: &ChatContext) -> Result<ChatReply, AiError> {
        let api_key = self.settings.credential()?;
        let context_json = serde_json::to_string(context)?;

        let request = GenerateRequest {
            contents: vec![
                Content::user(vec![Part::text(CHAT_PREAMBLE)]),
                Content::model(vec![Part::text(CHAT_ACKNOWLEDGEMENT)]),
                Content::user(vec![Part::text(chat_turn(&context_json, query))]),
            ],
            tools: vec![reschedule_tool()],
            config: self.settings.chat_generation.clone(),
        };

        let outcome = run_fallback(
            &self.backend,
            api_key,
            &self.settings.candidates,
            &request,
            accept_reply,
        )
        .await;
        let (reply, candidate, _) = outcome.into_result()?;
        info!(
            candidate = %candidate,
            tool_calls = reply.tool_invocations.len(),
            "chat reply received"
        );
        Ok(reply)
    }
}

fn accept_reply(resp: GenerateContentResponse) -> Result<ChatReply, AiError> {
    if let Some(reason) = resp.block_reason() {
        return Err(AiError::Malformed(format!("prompt blocked: {reason}")));
    }
    let reply = resp.text().trim().to_string();
    let tool_invocations: Vec<ToolInvocation> = resp
        .function_calls()
        .into_iter()
        .map(ToolInvocation::from)
        .collect();
    if reply.is_empty() && tool_invocations.is_empty() {
        return Err(AiError::Malformed("reply has neither text nor tool calls".to_string()));
    }
    Ok(ChatReply {
        reply,
        tool_invocations,
    })
}
