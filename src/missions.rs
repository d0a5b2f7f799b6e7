//! Mission board
//!
//! Nine interaction goals. Each one completes the first time the state
//! satisfies it and awards its points once.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::errors::{FeelienError, Result};
use crate::mood::{dominant_emotion, Emotion};
use crate::state::AppState;

/// Hints stop after the second one.
pub const MAX_HINT_LEVEL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MissionId(pub u8);

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What has to be true for a mission to complete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Goal {
    Emotion(Emotion),
    /// Someone closer than this many cm
    DistanceBelow(f64),
    Moving,
    Conversations(u32),
    /// Warmer than this many °C
    TemperatureAbove(f64),
}

impl Goal {
    fn is_met(self, state: &AppState, dominant: Emotion) -> bool {
        match self {
            Goal::Emotion(emotion) => dominant == emotion,
            Goal::DistanceBelow(cm) => state.environment.distance < cm,
            Goal::Moving => state.environment.is_moving(),
            Goal::Conversations(n) => state.communication_count >= n,
            Goal::TemperatureAbove(celsius) => state.environment.temperature > celsius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: &'static str,
    pub icon: &'static str,
    pub points: u32,
    pub hints: [&'static str; 2],
    pub goal: Goal,
    pub completed: bool,
    /// Hints revealed so far, `0..=2`
    pub hint_level: u8,
}

impl Mission {
    fn new(
        id: u8,
        title: &'static str,
        icon: &'static str,
        points: u32,
        hints: [&'static str; 2],
        goal: Goal,
    ) -> Self {
        Self {
            id: MissionId(id),
            title,
            icon,
            points,
            hints,
            goal,
            completed: false,
            hint_level: 0,
        }
    }

    /// Hints revealed so far.
    pub fn visible_hints(&self) -> &[&'static str] {
        &self.hints[..usize::from(self.hint_level)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionBoard {
    missions: Vec<Mission>,
    total_points: u32,
}

impl Default for MissionBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionBoard {
    pub fn new() -> Self {
        let missions = vec![
            Mission::new(
                1,
                "Make Feelien happy",
                "😊",
                10,
                ["Gentle or moderate stroking", "Friendly communication"],
                Goal::Emotion(Emotion::Happy),
            ),
            Mission::new(
                2,
                "Make Feelien mad",
                "😠",
                15,
                ["Press firmly", "Provoke it with words"],
                Goal::Emotion(Emotion::Mad),
            ),
            Mission::new(
                3,
                "Confuse Feelien",
                "🤔",
                20,
                [
                    "Say something strange during communication",
                    "Continue to do some strange things",
                ],
                Goal::Emotion(Emotion::Confused),
            ),
            Mission::new(
                4,
                "Make Feelien sleepy",
                "😴",
                25,
                [
                    "No communication for a long time",
                    "Make it feel bored (lower energy and patience)",
                ],
                Goal::Emotion(Emotion::Sleepy),
            ),
            Mission::new(
                5,
                "Scare Feelien",
                "😱",
                30,
                ["Intimidating communication", "Shake Feelien vigorously"],
                Goal::Emotion(Emotion::Scared),
            ),
            Mission::new(
                6,
                "Get up close",
                "👥",
                35,
                ["Move closer", "Move even closer"],
                Goal::DistanceBelow(30.0),
            ),
            Mission::new(
                7,
                "Take Feelien for a ride",
                "🍼",
                40,
                ["Pick up Feelien", "Shake Feelien a little"],
                Goal::Moving,
            ),
            Mission::new(
                8,
                "Have a chat",
                "💬",
                45,
                ["Communicate once", "Communicate a few more times"],
                Goal::Conversations(5),
            ),
            Mission::new(
                9,
                "Warm Feelien up",
                "🌡️",
                40,
                ["Stroke it", "Rub your hands and then stroke it"],
                Goal::TemperatureAbove(30.0),
            ),
        ];
        Self {
            missions,
            total_points: 0,
        }
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn get(&self, id: MissionId) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Points available across all missions.
    pub fn max_points(&self) -> u32 {
        self.missions.iter().map(|m| m.points).sum()
    }

    /// `(completed, total)`
    pub fn progress(&self) -> (usize, usize) {
        let done = self.missions.iter().filter(|m| m.completed).count();
        (done, self.missions.len())
    }

    /// Complete every mission the state now satisfies and return the ones
    /// completed by this call.
    pub fn check(&mut self, state: &AppState) -> Result<Vec<MissionId>> {
        let dominant = dominant_emotion(&state.personality)?.name;
        let mut newly = Vec::new();
        for mission in self.missions.iter_mut().filter(|m| !m.completed) {
            if mission.goal.is_met(state, dominant) {
                mission.completed = true;
                self.total_points += mission.points;
                info!(
                    "Mission {} completed: {} (+{} pts)",
                    mission.id, mission.title, mission.points
                );
                newly.push(mission.id);
            }
        }
        Ok(newly)
    }

    /// Reveal the next hint and return it; after the second hint the level
    /// stays put and the second hint is returned again.
    pub fn reveal_hint(&mut self, id: MissionId) -> Result<&'static str> {
        let mission = self
            .missions
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| FeelienError::unknown_parameter(format!("mission {id}")))?;
        if mission.hint_level < MAX_HINT_LEVEL {
            mission.hint_level += 1;
        }
        Ok(mission.hints[usize::from(mission.hint_level) - 1])
    }
}
