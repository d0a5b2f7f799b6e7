//! Human-readable descriptions of personality and environment readings.

use crate::types::Trait;

/// Quarter of the `0..=100` scale a value falls into, `0..=3`.
fn band(value: f64) -> usize {
    ((value / 25.0).floor().max(0.0) as usize).min(3)
}

impl Trait {
    /// One-line description of what `value` means for this trait.
    pub fn describe(self, value: f64) -> &'static str {
        let lines: [&'static str; 4] = match self {
            Trait::Happiness => [
                "Extremely unhappy with current situation",
                "Somewhat displeased",
                "Generally content",
                "Extremely joyful and satisfied",
            ],
            Trait::Energy => [
                "Almost lethargic, minimal movement",
                "Conserving energy, moves slowly",
                "Active and alert",
                "Highly energetic and animated",
            ],
            Trait::Curiosity => [
                "Disinterested in surroundings",
                "Mildly interested in new things",
                "Actively exploring and questioning",
                "Extremely fascinated by everything",
            ],
            Trait::Trust => [
                "Extremely suspicious of humans",
                "Cautious about intentions",
                "Generally trusting",
                "Completely trusts humans",
            ],
            Trait::Sociability => [
                "Prefers isolation from humans",
                "Tolerates brief interactions",
                "Enjoys company and conversation",
                "Seeks out extended social contact",
            ],
            Trait::Patience => [
                "Very impatient, easily frustrated",
                "Limited patience for delays",
                "Generally patient",
                "Extremely patient, rarely hurried",
            ],
            Trait::Confusion => [
                "Understands human customs well",
                "Some confusion about human behavior",
                "Frequently baffled by humans",
                "Completely bewildered by Earth culture",
            ],
            Trait::Intelligence => [
                "Basic analytical abilities",
                "Above average problem solving",
                "Highly intelligent",
                "Super-intelligent, far beyond humans",
            ],
            Trait::Anger => [
                "Calm and unbothered",
                "Mildly irritated",
                "Visibly annoyed",
                "Furious, shell bristling",
            ],
        };
        lines[band(value)]
    }
}

/// Colour of a parameter bar.
pub fn band_color(value: f64) -> &'static str {
    if value > 75.0 {
        "green"
    } else if value > 50.0 {
        "blue"
    } else if value > 25.0 {
        "yellow"
    } else {
        "red"
    }
}

/// Face shown inside the shell, driven by happiness alone.
pub fn happiness_glyph(happiness: f64) -> &'static str {
    if happiness > 75.0 {
        "😁"
    } else if happiness > 50.0 {
        "🙂"
    } else if happiness > 25.0 {
        "😐"
    } else {
        "☹️"
    }
}

pub fn disposition(happiness: f64) -> &'static str {
    if happiness > 50.0 {
        "Cooperative"
    } else {
        "Cautious"
    }
}

pub fn distance(cm: f64) -> &'static str {
    if cm < 10.0 {
        "Extremely close"
    } else if cm < 30.0 {
        "Very close - intimate zone"
    } else if cm < 100.0 {
        "Personal space"
    } else {
        "Distant observation"
    }
}

pub fn force(force: f64) -> &'static str {
    if force == 0.0 {
        "No contact"
    } else if force < 25.0 {
        "Light touch"
    } else if force < 75.0 {
        "Medium touch"
    } else {
        "Strong contact"
    }
}

pub fn motion(motion: f64) -> &'static str {
    if motion == 0.0 {
        "No movement"
    } else if motion < 30.0 {
        "Gentle movement"
    } else if motion < 50.0 {
        "Moderate movement"
    } else {
        "Intense movement"
    }
}

pub fn temperature(celsius: f64) -> &'static str {
    if celsius < 5.0 {
        "Freezing"
    } else if celsius < 15.0 {
        "Cold"
    } else if celsius < 25.0 {
        "Comfortable"
    } else if celsius < 35.0 {
        "Warm"
    } else {
        "Hot"
    }
}
