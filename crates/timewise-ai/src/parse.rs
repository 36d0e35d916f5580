//! Timetable image → canonical [`Timetable`].

use timewise_core::{NormalizeOptions, Timetable, normalize_text};
use tracing::{debug, info};

use crate::assistant::ScheduleAssistant;
use crate::client::{Content, GenerateContentResponse, GenerateRequest, GenerativeBackend, Part};
use crate::config::Candidate;
use crate::error::{AiError, AttemptFailure};
use crate::fallback::run_fallback;
use crate::prompt::parse_prompt;

/// A successfully parsed timetable and which candidate produced it.
#[derive(Debug)]
pub struct ParsedSchedule {
    pub timetable: Timetable,
    pub candidate: Candidate,
    /// Candidates that failed before the successful one.
    pub failures: Vec<AttemptFailure>,
}

impl<B: GenerativeBackend> ScheduleAssistant<B> {
    /// Send the image to each candidate in turn until one returns output the
    /// normalizer accepts.
    ///
    /// Fails with [`AiError::MissingCredential`] before any request when no
    /// API key is configured.
    pub async fn parse_schedule(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<ParsedSchedule, AiError> {
        let api_key = self.settings.credential()?;
        info!(
            key_len = api_key.len(),
            image_bytes = image.len(),
            mime_type,
            "starting timetable parse"
        );

        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::text(parse_prompt()),
                Part::inline_image(image, mime_type),
            ])],
            tools: Vec::new(),
            config: self.settings.parse_generation.clone(),
        };
        let opts = &self.settings.normalize;

        let outcome = run_fallback(
            &self.backend,
            api_key,
            &self.settings.candidates,
            &request,
            |resp| accept_timetable(resp, opts),
        )
        .await;
        let (timetable, candidate, failures) = outcome.into_result()?;

        info!(
            candidate = %candidate,
            days = timetable.len(),
            periods = timetable.iter().map(|d| d.periods.len()).sum::<usize>(),
            "timetable parsed"
        );
        Ok(ParsedSchedule {
            timetable,
            candidate,
            failures,
        })
    }
}

fn accept_timetable(
    resp: GenerateContentResponse,
    opts: &NormalizeOptions,
) -> Result<Timetable, AiError> {
    if let Some(reason) = resp.block_reason() {
        return Err(AiError::Malformed(format!("prompt blocked: {reason}")));
    }
    let text = resp.text();
    if text.trim().is_empty() {
        return Err(AiError::Malformed("empty response".to_string()));
    }
    debug!(chars = text.len(), "normalizing model output");
    Ok(normalize_text(&text, opts)?)
}
