//! Emotion scorer.
//!
//! Seven fixed-weight linear scores over the personality; the highest one is
//! the emotion the alien shows. Scores are comparative, not probabilities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{FeelienError, Result};
use crate::types::Personality;

/// The closed set of displayable emotions, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Curious,
    Sleepy,
    Confused,
    Mad,
    Scared,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Self::Happy,
        Self::Sad,
        Self::Curious,
        Self::Sleepy,
        Self::Confused,
        Self::Mad,
        Self::Scared,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Curious => "curious",
            Self::Sleepy => "sleepy",
            Self::Confused => "confused",
            Self::Mad => "mad",
            Self::Scared => "scared",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Curious => "🧐",
            Self::Sleepy => "😴",
            Self::Confused => "🤔",
            Self::Mad => "😠",
            Self::Scared => "😱",
        }
    }

    /// Raw score for this emotion. Callers validate `p` first.
    fn score(self, p: &Personality) -> f64 {
        match self {
            Self::Happy => 0.5 * p.happiness + 0.3 * p.trust + 0.2 * p.energy,
            Self::Sad => {
                0.5 * (100.0 - p.happiness) + 0.3 * (100.0 - p.trust) + 0.2 * (100.0 - p.energy)
            }
            Self::Curious => 0.5 * p.curiosity + 0.3 * p.intelligence + 0.2 * p.energy,
            Self::Sleepy => 0.7 * (100.0 - p.energy) + 0.3 * p.patience,
            Self::Confused => 0.6 * p.confusion + 0.4 * (100.0 - p.intelligence),
            Self::Mad => 0.3 * (100.0 - p.patience) + 0.5 * p.anger + 0.2 * (100.0 - p.trust),
            Self::Scared => {
                0.3 * (100.0 - p.trust)
                    + 0.5 * (100.0 - p.sociability)
                    + 0.1 * (100.0 - p.energy)
                    + 0.1 * (100.0 - p.happiness)
            }
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = FeelienError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.name() == lower)
            .ok_or_else(|| FeelienError::unknown_parameter(s))
    }
}

/// One scored emotion with its display glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionInfo {
    pub name: Emotion,
    pub score: f64,
    pub emoji: &'static str,
}

/// Score every emotion, in declaration order.
pub fn score_all(personality: &Personality) -> Result<[EmotionInfo; 7]> {
    personality.validate()?;
    Ok(Emotion::ALL.map(|name| EmotionInfo {
        name,
        score: name.score(personality),
        emoji: name.glyph(),
    }))
}

/// The highest-scoring emotion; ties go to the earlier-declared one.
pub fn dominant_emotion(personality: &Personality) -> Result<EmotionInfo> {
    let mut scored = score_all(personality)?;
    // Stable sort keeps declaration order among equal scores.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(scored[0])
}
