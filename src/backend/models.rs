//! Wire types for the alien backend and the adapters that normalise them.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{FeelienError, Result};
use crate::types::{Environment, OutputParams, Personality, Trait};

lazy_static! {
    static ref PARAMETERS_BLOCK: Regex =
        Regex::new(r"(?s)\[PARAMETERS_UPDATE\](.*?)\[/PARAMETERS_UPDATE\]").unwrap();
}

/// Body of `POST /api/alien`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlienRequest {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Environment>,
}

impl AlienRequest {
    fn base(source: &str) -> Self {
        Self {
            source: source.to_string(),
            changed: None,
            reset: None,
            sound: None,
            params: None,
        }
    }

    /// Ask for the latest state without reporting a change.
    pub fn poll(source: &str) -> Self {
        Self {
            changed: Some(false),
            ..Self::base(source)
        }
    }

    pub fn reset(source: &str) -> Self {
        Self {
            reset: Some(true),
            ..Self::base(source)
        }
    }

    /// Let the alien vocalise in reaction to the given surroundings.
    pub fn vocalization(source: &str, environment: Environment) -> Self {
        Self {
            sound: Some("vocalization".to_string()),
            params: Some(environment),
            changed: Some(true),
            ..Self::base(source)
        }
    }
}

/// Body of `POST /process-text`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    pub text: String,
    pub system_prompt: String,
    pub alien_parameters: Option<Personality>,
}

/// Any subset of personality traits.
///
/// Older backends send eight traits without `anger`; missing traits keep
/// their current value when the patch is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalityPatch {
    pub happiness: Option<f64>,
    pub energy: Option<f64>,
    pub curiosity: Option<f64>,
    pub trust: Option<f64>,
    pub sociability: Option<f64>,
    pub patience: Option<f64>,
    pub confusion: Option<f64>,
    pub intelligence: Option<f64>,
    pub anger: Option<f64>,
}

impl PersonalityPatch {
    pub fn get(&self, name: Trait) -> Option<f64> {
        match name {
            Trait::Happiness => self.happiness,
            Trait::Energy => self.energy,
            Trait::Curiosity => self.curiosity,
            Trait::Trust => self.trust,
            Trait::Sociability => self.sociability,
            Trait::Patience => self.patience,
            Trait::Confusion => self.confusion,
            Trait::Intelligence => self.intelligence,
            Trait::Anger => self.anger,
        }
    }

    /// Overlay this patch on `current`, clamping what the backend sent.
    pub fn apply_to(&self, current: &Personality) -> Personality {
        let mut out = *current;
        for name in Trait::ALL {
            if let Some(value) = self.get(name) {
                out.set(name, value);
            }
        }
        out.clamped()
    }

    pub fn is_empty(&self) -> bool {
        Trait::ALL.iter().all(|t| self.get(*t).is_none())
    }
}

/// Reply of `POST /api/alien`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReply {
    pub alien: Option<PersonalityPatch>,
    pub input: Option<Environment>,
    pub output: Option<OutputParams>,
    pub sequence: Option<u64>,
    pub text: Option<String>,
    pub is_pending: Option<bool>,
}

/// Reply of `POST /process-text` and `POST /process-audio`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub content: Option<String>,
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub transcript: Option<String>,
    pub alien_parameters: Option<PersonalityPatch>,
    pub output_params: Option<OutputParams>,
}

/// Error body sent with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorReply {
    pub error: Option<String>,
}

/// Keys only the chat endpoints send.
const CHAT_KEYS: [&str; 4] = ["content", "success", "error", "transcript"];

/// Every reply shape the backend produces.
///
/// A body carrying any chat-only key is a chat reply, even when `content` is
/// missing; anything else is a state reply.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Chat(ChatReply),
    State(StateReply),
}

impl<'de> Deserialize<'de> for BackendReply {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_chat = value
            .as_object()
            .is_some_and(|body| CHAT_KEYS.iter().any(|key| body.contains_key(*key)));
        let reply = if is_chat {
            ChatReply::deserialize(value).map(BackendReply::Chat)
        } else {
            StateReply::deserialize(value).map(BackendReply::State)
        };
        reply.map_err(serde::de::Error::custom)
    }
}

/// Canonical update handed to the application state.
#[derive(Debug, Clone, PartialEq)]
pub struct AlienUpdate {
    pub personality: Option<Personality>,
    pub environment: Option<Environment>,
    pub output: Option<OutputParams>,
    pub sequence: Option<u64>,
    /// What the alien said, with any parameter block removed
    pub text: Option<String>,
    pub transcript: Option<String>,
    pub is_pending: Option<bool>,
    pub received_at: DateTime<Utc>,
}

impl AlienUpdate {
    pub fn empty() -> Self {
        Self {
            personality: None,
            environment: None,
            output: None,
            sequence: None,
            text: None,
            transcript: None,
            is_pending: None,
            received_at: Utc::now(),
        }
    }
}

impl BackendReply {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Fail unless this is a chat reply.
    pub fn into_chat(self) -> Result<Self> {
        match self {
            BackendReply::Chat(_) => Ok(self),
            BackendReply::State(_) => Err(FeelienError::parse(
                "Expected a chat reply, got an alien state",
            )),
        }
    }

    pub fn sequence(&self) -> Option<u64> {
        match self {
            BackendReply::State(reply) => reply.sequence,
            BackendReply::Chat(_) => None,
        }
    }

    /// Normalise into an `AlienUpdate`, resolving partial personalities
    /// against `current`.
    pub fn into_update(self, current: &Personality) -> AlienUpdate {
        match self {
            BackendReply::State(reply) => AlienUpdate {
                personality: reply.alien.map(|patch| patch.apply_to(current)),
                environment: reply.input.map(|env| env.clamped()),
                output: reply.output,
                sequence: reply.sequence,
                text: reply.text,
                is_pending: reply.is_pending,
                ..AlienUpdate::empty()
            },
            BackendReply::Chat(reply) => {
                let content = reply.content.as_deref().unwrap_or_default();
                let (text, inline) = split_parameter_block(content);
                // An inline block overrides the structured field.
                let patch = inline.or(reply.alien_parameters);
                AlienUpdate {
                    personality: patch.map(|p| p.apply_to(current)),
                    output: reply.output_params,
                    text: Some(text),
                    transcript: reply.transcript,
                    ..AlienUpdate::empty()
                }
            }
        }
    }
}

/// Remove a `[PARAMETERS_UPDATE]…[/PARAMETERS_UPDATE]` block from chat text
/// and parse its JSON body.
///
/// A block that does not parse is still removed, but yields no patch.
pub fn split_parameter_block(content: &str) -> (String, Option<PersonalityPatch>) {
    let Some(captures) = PARAMETERS_BLOCK.captures(content) else {
        return (content.to_string(), None);
    };
    let patch = captures
        .get(1)
        .and_then(|body| serde_json::from_str::<PersonalityPatch>(body.as_str().trim()).ok())
        .filter(|patch| !patch.is_empty());
    let cleaned = PARAMETERS_BLOCK.replace(content, "").trim().to_string();
    (cleaned, patch)
}
