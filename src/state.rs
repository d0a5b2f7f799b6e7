//! Application state
//!
//! One explicit value holding everything the mood engine and the mission
//! board read. Callers own it and pass it where needed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::backend::AlienUpdate;
use crate::errors::{FeelienError, Result};
use crate::mood::MoodReport;
use crate::types::{check_range, Environment, OutputParams, Personality, Trait, PARAM_MAX};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub personality: Personality,
    pub environment: Environment,
    /// Last output decided by the backend
    pub output: OutputParams,
    pub backend_enabled: bool,
    /// Environment edited locally since the last exchange with the backend
    pub env_changed: bool,
    /// Backend is still working on a request
    pub processing: bool,
    /// Completed conversations with the alien
    pub communication_count: u32,
    pub last_reply: Option<String>,
    pub last_transcript: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            personality: Personality::default(),
            environment: Environment::default(),
            output: OutputParams::default(),
            backend_enabled: true,
            env_changed: false,
            processing: false,
            communication_count: 0,
            last_reply: None,
            last_transcript: None,
            updated_at: None,
        }
    }
}

impl AppState {
    pub fn new(personality: Personality, environment: Environment) -> Result<Self> {
        personality.validate()?;
        environment.validate()?;
        Ok(Self {
            personality,
            environment,
            ..Self::default()
        })
    }

    /// Replace the observed environment after a local edit.
    pub fn set_environment(&mut self, environment: Environment) -> Result<()> {
        environment.validate()?;
        self.environment = environment;
        self.env_changed = true;
        Ok(())
    }

    /// Local simulation control for a single trait.
    pub fn set_trait(&mut self, name: Trait, value: f64) -> Result<()> {
        check_range(name.name(), value, 0.0, PARAM_MAX)?;
        self.personality.set(name, value);
        Ok(())
    }

    /// Fail with `BackendDisabled` when backend traffic is switched off.
    pub fn ensure_backend(&self) -> Result<()> {
        if self.backend_enabled {
            Ok(())
        } else {
            Err(FeelienError::BackendDisabled)
        }
    }

    /// Merge a backend update; absent parts are left untouched.
    pub fn apply(&mut self, update: AlienUpdate) {
        if let Some(personality) = update.personality {
            self.personality = personality;
        }
        if let Some(environment) = update.environment {
            self.environment = environment;
        }
        if let Some(output) = update.output {
            self.output = output;
        }
        if let Some(pending) = update.is_pending {
            self.processing = pending;
        }
        if update.text.is_some() {
            self.last_reply = update.text;
        }
        if update.transcript.is_some() {
            self.last_transcript = update.transcript;
        }
        self.updated_at = Some(update.received_at);
        debug!("State updated (sequence {:?})", update.sequence);
    }

    /// Count a finished conversation turn; the environment is now in sync.
    pub fn record_communication(&mut self) {
        self.communication_count = self.communication_count.saturating_add(1);
        self.env_changed = false;
    }

    /// Back to the initial personality and environment.
    ///
    /// The communication count survives a reset.
    pub fn reset(&mut self) {
        self.personality = Personality::default();
        self.environment = Environment::default();
        self.output = OutputParams::default();
        self.env_changed = false;
        self.processing = false;
        self.last_reply = None;
        self.last_transcript = None;
    }

    pub fn mood(&self) -> Result<MoodReport> {
        MoodReport::evaluate(&self.personality, &self.environment)
    }
}
