//! # Feelien
//!
//! Mood and behaviour engine for an interactive alien companion.
//!
//! The alien's personality and its surroundings go in; the dominant emotion,
//! shell inflation and tail swing come out. Around that pure core sit the
//! application state, a mission board, and a thin client for the LLM backend
//! that decides what the alien says and how it lights up.

pub mod backend;
pub mod config;
pub mod errors;
pub mod missions;
pub mod mood;
pub mod state;
pub mod types;

pub use config::FeelienConfig;
pub use errors::{FeelienError, Result};
pub use missions::{MissionBoard, MissionId};
pub use mood::{Emotion, EmotionInfo, MoodReport, TailSwing};
pub use state::AppState;
pub use types::{AreaTouched, Environment, OutputParams, Personality, Trait};
