//! Mood and behaviour derivation.
//!
//! Pure functions from `(Personality, Environment)` to what the alien shows:
//! the dominant emotion, shell inflation and tail swing. Nothing in here
//! reads global state or performs I/O.

pub mod behavior;
pub mod describe;
pub mod emotion;
pub mod shake;

pub use behavior::{puff_state, tail_swing, TailSwing};
pub use emotion::{dominant_emotion, score_all, Emotion, EmotionInfo};
pub use shake::shake_angle;

use serde::Serialize;

use crate::errors::Result;
use crate::types::{Environment, Personality};

/// Everything derived from one `(Personality, Environment)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodReport {
    pub emotion: EmotionInfo,
    pub scores: [EmotionInfo; 7],
    /// `true` while the shell is deflated
    pub puffed: bool,
    pub tail: TailSwing,
    pub face: &'static str,
    pub disposition: &'static str,
}

impl MoodReport {
    pub fn evaluate(personality: &Personality, environment: &Environment) -> Result<Self> {
        Ok(Self {
            emotion: dominant_emotion(personality)?,
            scores: score_all(personality)?,
            puffed: puff_state(personality, environment)?,
            tail: tail_swing(personality, environment)?,
            face: describe::happiness_glyph(personality.happiness),
            disposition: describe::disposition(personality.happiness),
        })
    }
}
