//! Static configuration for the Gemini integration.

use std::fmt;
use std::str::FromStr;

use timewise_core::NormalizeOptions;

use crate::error::AiError;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "NEXT_PUBLIC_GEMINI_API_KEY"];

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Cheaper, faster models first; the capable one is the last resort.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-2.0-flash-exp",
    "gemini-1.5-pro",
];

pub const DEFAULT_VERSIONS: &[ApiVersion] = &[ApiVersion::V1Beta, ApiVersion::V1];

/// REST API version segment of the endpoint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V1Beta,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V1Beta => "v1beta",
        }
    }

    /// `responseMimeType` is rejected by the stable endpoint.
    pub fn supports_json_mode(&self) -> bool {
        matches!(self, Self::V1Beta)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v1beta" => Ok(Self::V1Beta),
            other => Err(format!("unknown API version '{other}' (expected v1 or v1beta)")),
        }
    }
}

/// One (endpoint version, model) pair in the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: ApiVersion,
    pub model: String,
}

impl Candidate {
    pub fn new(version: ApiVersion, model: impl Into<String>) -> Self {
        Self {
            version,
            model: model.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.version, self.model)
    }
}

/// Expand preference lists into the ordered chain, model-major: every
/// version of the first model is tried before moving to the next model.
pub fn candidates<S: AsRef<str>>(models: &[S], versions: &[ApiVersion]) -> Vec<Candidate> {
    models
        .iter()
        .flat_map(|m| versions.iter().map(move |v| Candidate::new(*v, m.as_ref())))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask for `application/json` output where the endpoint supports it.
    pub json_mode: bool,
}

impl GenerationConfig {
    pub fn for_parsing() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 8192,
            json_mode: true,
        }
    }

    pub fn for_chat() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
            json_mode: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiSettings {
    /// May be empty; checked before any request is made.
    pub api_key: String,
    pub base_url: String,
    pub candidates: Vec<Candidate>,
    pub parse_generation: GenerationConfig,
    pub chat_generation: GenerationConfig,
    pub normalize: NormalizeOptions,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            candidates: candidates(DEFAULT_MODELS, DEFAULT_VERSIONS),
            parse_generation: GenerationConfig::for_parsing(),
            chat_generation: GenerationConfig::for_chat(),
            normalize: NormalizeOptions::default(),
        }
    }
}

impl AiSettings {
    /// Defaults with the API key read from the process environment.
    pub fn from_env() -> Self {
        Self {
            api_key: resolve_api_key(|name| std::env::var(name).ok()),
            ..Self::default()
        }
    }

    /// The API key, or [`AiError::MissingCredential`] if it is blank.
    pub fn credential(&self) -> Result<&str, AiError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            Err(AiError::MissingCredential)
        } else {
            Ok(key)
        }
    }
}

/// First non-blank value among [`API_KEY_VARS`], trimmed; empty if none.
pub fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> String {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn primary_key_wins() {
        let key = resolve_api_key(env(&[
            ("GEMINI_API_KEY", "primary"),
            ("NEXT_PUBLIC_GEMINI_API_KEY", "secondary"),
        ]));
        assert_eq!(key, "primary");
    }

    #[test]
    fn blank_primary_falls_back() {
        let key = resolve_api_key(env(&[
            ("GEMINI_API_KEY", "   "),
            ("NEXT_PUBLIC_GEMINI_API_KEY", " secondary\n"),
        ]));
        assert_eq!(key, "secondary");
    }

    #[test]
    fn no_key_is_empty() {
        assert_eq!(resolve_api_key(env(&[])), "");
    }

    #[test]
    fn blank_credential_rejected() {
        let settings = AiSettings {
            api_key: "  ".into(),
            ..AiSettings::default()
        };
        assert!(matches!(settings.credential(), Err(AiError::MissingCredential)));
    }

    #[test]
    fn candidates_are_model_major() {
        let chain = candidates(&["fast", "slow"], DEFAULT_VERSIONS);
        let labels: Vec<String> = chain.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec!["v1beta/fast", "v1/fast", "v1beta/slow", "v1/slow"]
        );
    }

    #[test]
    fn default_chain_covers_every_pair() {
        let settings = AiSettings::default();
        assert_eq!(
            settings.candidates.len(),
            DEFAULT_MODELS.len() * DEFAULT_VERSIONS.len()
        );
        assert_eq!(settings.candidates[0].model, DEFAULT_MODELS[0]);
    }

    #[test]
    fn api_version_parse() {
        assert_eq!("V1BETA".parse::<ApiVersion>(), Ok(ApiVersion::V1Beta));
        assert_eq!("v1".parse::<ApiVersion>(), Ok(ApiVersion::V1));
        assert!("v2".parse::<ApiVersion>().is_err());
    }
}
