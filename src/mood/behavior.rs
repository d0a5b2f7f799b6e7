//! Physical behaviour derived from personality and environment.
//!
//! Shell inflation and the idle tail swing. Both are recomputed from scratch
//! on every call; there is no debouncing or memory of earlier states.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::{Environment, Personality};

/// Agitation at or below this keeps the shell deflated.
pub const PUFF_AGITATION_LIMIT: f64 = 40.0;
/// Touch force at or above this always inflates the shell.
pub const PUFF_FORCE_LIMIT: f64 = 70.0;
/// Smallest tail swing, so the tail always visibly moves.
pub const MIN_SWING_DEGREES: f64 = 10.0;
/// Largest tail swing before emotion and force scaling.
pub const MAX_SWING_DEGREES: f64 = 90.0;

/// Idle tail animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailSwing {
    /// Pause between swings, in seconds
    pub delay_secs: f64,
    /// Swing amplitude, in degrees
    pub step_degrees: f64,
}

/// `0.7·anger + 0.3·(100 − patience)`
pub fn agitation(personality: &Personality) -> f64 {
    0.7 * personality.anger + 0.3 * (100.0 - personality.patience)
}

/// Whether the shell is deflated (`true`) or puffed up (`false`).
pub fn puff_state(personality: &Personality, environment: &Environment) -> Result<bool> {
    personality.validate()?;
    environment.validate()?;
    Ok(agitation(personality) <= PUFF_AGITATION_LIMIT && environment.force < PUFF_FORCE_LIMIT)
}

/// Tail swing timing and amplitude.
pub fn tail_swing(personality: &Personality, environment: &Environment) -> Result<TailSwing> {
    personality.validate()?;
    environment.validate()?;

    let p = personality;
    let delay_secs = 2.0
        * ((1.0 - p.energy / 100.0) * 0.5
            + (1.0 - p.trust / 100.0) * 0.3
            + (p.confusion / 100.0) * 0.2);

    let emotional =
        (p.happiness / 100.0) * 0.5 + (p.curiosity / 100.0) * 0.3 + (p.sociability / 100.0) * 0.2;
    let force_factor = 1.0 / (1.0 + environment.force / 50.0);
    let step_degrees = (MAX_SWING_DEGREES * emotional * force_factor)
        .floor()
        .max(MIN_SWING_DEGREES);

    Ok(TailSwing {
        delay_secs,
        step_degrees,
    })
}
