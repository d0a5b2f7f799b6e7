//! Animation of backend-decided output.
//!
//! The backend picks colour, emergence and shake parameters; the client only
//! turns them into a rotation angle over time and display strings.

use std::f64::consts::PI;
use std::time::Duration;

use crate::types::OutputParams;

/// Rotation in degrees `elapsed` into a shake cycle.
///
/// `sin(t · f · 2π) · step`, or `0` when the alien is not shaking.
pub fn shake_angle(output: &OutputParams, elapsed: Duration) -> f64 {
    if output.shake_frequency <= 0.0 {
        return 0.0;
    }
    (elapsed.as_secs_f64() * output.shake_frequency * PI * 2.0).sin() * output.shake_step
}

impl OutputParams {
    pub fn is_shaking(&self) -> bool {
        self.shake_frequency > 0.0
    }

    /// CSS colour string, e.g. `rgb(255, 0, 12)`.
    pub fn css_rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.rgb_red, self.rgb_green, self.rgb_blue)
    }

    pub fn status(&self) -> &'static str {
        if self.come_out {
            "Emerged"
        } else {
            "Hidden"
        }
    }
}
