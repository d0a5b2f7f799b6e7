use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{FeelienError, Result};

/// Upper bound of every personality trait and of force/motion readings.
pub const PARAM_MAX: f64 = 100.0;

/// Core personality of the alien.
///
/// Every trait lives on a `0..=100` scale. The engine never mutates it; only
/// backend replies and local simulation controls do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub happiness: f64,
    pub energy: f64,
    pub curiosity: f64,
    pub trust: f64,
    pub sociability: f64,
    pub patience: f64,
    pub confusion: f64,
    pub intelligence: f64,
    pub anger: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            happiness: 50.0,
            energy: 70.0,
            curiosity: 90.0,
            trust: 30.0,
            sociability: 60.0,
            patience: 40.0,
            confusion: 80.0,
            intelligence: 95.0,
            anger: 10.0,
        }
    }
}

impl Personality {
    /// Every trait set to the same value.
    pub fn uniform(value: f64) -> Self {
        Self {
            happiness: value,
            energy: value,
            curiosity: value,
            trust: value,
            sociability: value,
            patience: value,
            confusion: value,
            intelligence: value,
            anger: value,
        }
    }

    pub fn get(&self, name: Trait) -> f64 {
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

    pub fn set(&mut self, name: Trait, value: f64) {
        let slot = match name {
            Trait::Happiness => &mut self.happiness,
            Trait::Energy => &mut self.energy,
            Trait::Curiosity => &mut self.curiosity,
            Trait::Trust => &mut self.trust,
            Trait::Sociability => &mut self.sociability,
            Trait::Patience => &mut self.patience,
            Trait::Confusion => &mut self.confusion,
            Trait::Intelligence => &mut self.intelligence,
            Trait::Anger => &mut self.anger,
        };
        *slot = value;
    }

    /// Reject any trait that is not a finite number in `0..=100`.
    pub fn validate(&self) -> Result<()> {
        for name in Trait::ALL {
            check_range(name.name(), self.get(name), 0.0, PARAM_MAX)?;
        }
        Ok(())
    }

    /// Copy with every finite trait clamped into `0..=100`.
    ///
    /// Non-finite values are left alone so `validate` still rejects them.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for name in Trait::ALL {
            let v = out.get(name);
            if v.is_finite() {
                out.set(name, v.clamp(0.0, PARAM_MAX));
            }
        }
        out
    }
}

/// Names of the personality traits, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Happiness,
    Energy,
    Curiosity,
    Trust,
    Sociability,
    Patience,
    Confusion,
    Intelligence,
    Anger,
}

impl Trait {
    pub const ALL: [Trait; 9] = [
        Self::Happiness,
        Self::Energy,
        Self::Curiosity,
        Self::Trust,
        Self::Sociability,
        Self::Patience,
        Self::Confusion,
        Self::Intelligence,
        Self::Anger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Happiness => "happiness",
            Self::Energy => "energy",
            Self::Curiosity => "curiosity",
            Self::Trust => "trust",
            Self::Sociability => "sociability",
            Self::Patience => "patience",
            Self::Confusion => "confusion",
            Self::Intelligence => "intelligence",
            Self::Anger => "anger",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Trait {
    type Err = FeelienError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Trait::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| FeelienError::unknown_parameter(s))
    }
}

/// Part of the alien that was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaTouched {
    Eyes,
    Mouth,
    Forehead,
    Face,
    #[default]
    None,
}

impl AreaTouched {
    pub fn as_str(self) -> &'static str {
        match self {
            AreaTouched::Eyes => "eyes",
            AreaTouched::Mouth => "mouth",
            AreaTouched::Forehead => "forehead",
            AreaTouched::Face => "face",
            AreaTouched::None => "",
        }
    }
}

impl FromStr for AreaTouched {
    type Err = FeelienError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "eyes" => Ok(AreaTouched::Eyes),
            "mouth" => Ok(AreaTouched::Mouth),
            "forehead" => Ok(AreaTouched::Forehead),
            "face" => Ok(AreaTouched::Face),
            "" | "none" => Ok(AreaTouched::None),
            _ => Err(FeelienError::unknown_parameter(s)),
        }
    }
}

// The backend uses an empty string for "nothing touched"
impl Serialize for AreaTouched {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AreaTouched {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|_| {
            warn!("Unknown touched area {:?}, treating as untouched", s);
            AreaTouched::None
        }))
    }
}

/// Motion arrives either as a level or as a plain "is moving" flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MotionReading {
    Level(f64),
    Moving(bool),
}

impl MotionReading {
    pub fn level(self) -> f64 {
        match self {
            MotionReading::Level(v) => v,
            MotionReading::Moving(true) => PARAM_MAX,
            MotionReading::Moving(false) => 0.0,
        }
    }
}

fn deserialize_motion<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    MotionReading::deserialize(deserializer).map(MotionReading::level)
}

/// Physical conditions around the alien.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Distance to the nearest person, in cm
    pub distance: f64,
    /// Touch intensity, `0..=100`
    pub force: f64,
    /// Motion intensity, `0..=100`
    #[serde(deserialize_with = "deserialize_motion", alias = "moving")]
    pub motion: f64,
    /// Ambient temperature in °C
    pub temperature: f64,
    #[serde(default)]
    pub area_touched: AreaTouched,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            distance: 100.0,
            force: 0.0,
            motion: 0.0,
            temperature: 22.5,
            area_touched: AreaTouched::None,
        }
    }
}

impl Environment {
    pub fn validate(&self) -> Result<()> {
        check_range("distance", self.distance, 0.0, f64::MAX)?;
        check_range("force", self.force, 0.0, PARAM_MAX)?;
        check_range("motion", self.motion, 0.0, PARAM_MAX)?;
        check_range("temperature", self.temperature, f64::MIN, f64::MAX)?;
        Ok(())
    }

    pub fn is_moving(&self) -> bool {
        self.motion > 0.0
    }

    /// Copy with finite readings pulled into their valid ranges.
    pub fn clamped(&self) -> Self {
        let clamp = |v: f64, min: f64, max: f64| if v.is_finite() { v.clamp(min, max) } else { v };
        Self {
            distance: clamp(self.distance, 0.0, f64::MAX),
            force: clamp(self.force, 0.0, PARAM_MAX),
            motion: clamp(self.motion, 0.0, PARAM_MAX),
            ..*self
        }
    }
}

/// Colour channels may arrive as floats or outside `0..=255`.
fn deserialize_channel<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, 255.0) as u8)
}

/// Physical output decided by the backend; the client only animates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputParams {
    pub come_out: bool,
    /// Shake frequency in Hz
    pub shake_frequency: f64,
    /// Shake amplitude in degrees
    pub shake_step: f64,
    #[serde(deserialize_with = "deserialize_channel")]
    pub rgb_red: u8,
    #[serde(deserialize_with = "deserialize_channel")]
    pub rgb_green: u8,
    #[serde(deserialize_with = "deserialize_channel")]
    pub rgb_blue: u8,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            come_out: false,
            shake_frequency: 0.0,
            shake_step: 0.0,
            rgb_red: 128,
            rgb_green: 128,
            rgb_blue: 128,
        }
    }
}

pub(crate) fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(FeelienError::InvalidParameter {
            field,
            value,
            reason: "must be a finite number",
        });
    }
    if value < min || value > max {
        return Err(FeelienError::InvalidParameter {
            field,
            value,
            reason: "out of range",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_personality_is_valid() {
        assert!(Personality::default().validate().is_ok());
    }

    #[test]
    fn test_nan_trait_rejected() {
        let mut p = Personality::default();
        p.curiosity = f64::NAN;
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            FeelienError::InvalidParameter { field: "curiosity", .. }
        ));
    }

    #[test]
    fn test_out_of_range_trait_rejected() {
        let mut p = Personality::default();
        p.anger = 120.0;
        assert!(p.validate().is_err());
        assert!(p.clamped().validate().is_ok());
        assert_eq!(p.clamped().anger, 100.0);
    }

    #[test]
    fn test_clamped_keeps_nan() {
        let mut p = Personality::default();
        p.trust = f64::NAN;
        assert!(p.clamped().trust.is_nan());
    }

    #[test]
    fn test_trait_parse() {
        assert_eq!("Happiness".parse::<Trait>().unwrap(), Trait::Happiness);
        assert_eq!(" anger ".parse::<Trait>().unwrap(), Trait::Anger);
        assert!("grumpiness".parse::<Trait>().is_err());
    }

    #[test]
    fn test_personality_missing_field_fails_to_parse() {
        let json = r#"{"happiness":80,"energy":70,"curiosity":90,"trust":80,
            "sociability":60,"patience":40,"confusion":10,"intelligence":95}"#;
        assert!(serde_json::from_str::<Personality>(json).is_err());
    }

    #[test]
    fn test_environment_wire_format() {
        let json = r#"{"distance":25,"force":50,"motion":0,"temperature":22.5,"areaTouched":""}"#;
        let env: Environment = serde_json::from_str(json).unwrap();
        assert_eq!(env.distance, 25.0);
        assert_eq!(env.area_touched, AreaTouched::None);

        let back = serde_json::to_value(env).unwrap();
        assert_eq!(back["areaTouched"], "");
    }

    #[test]
    fn test_environment_moving_flag() {
        let json = r#"{"distance":100,"force":0,"moving":true,"temperature":20,"areaTouched":"face"}"#;
        let env: Environment = serde_json::from_str(json).unwrap();
        assert!(env.is_moving());
        assert_eq!(env.motion, 100.0);
        assert_eq!(env.area_touched, AreaTouched::Face);
    }

    #[test]
    fn test_negative_distance_rejected() {
        let env = Environment {
            distance: -1.0,
            ..Environment::default()
        };
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_output_params_wire_format() {
        let json = r#"{"comeOut":true,"shakeFrequency":2.5,"shakeStep":10,
            "rgbRed":255,"rgbGreen":0,"rgbBlue":12}"#;
        let out: OutputParams = serde_json::from_str(json).unwrap();
        assert!(out.come_out);
        assert_eq!(out.rgb_blue, 12);
    }

    #[test]
    fn test_output_channels_are_clamped() {
        let json = r#"{"comeOut":false,"shakeFrequency":0,"shakeStep":0,
            "rgbRed":300,"rgbGreen":127.6,"rgbBlue":-4}"#;
        let out: OutputParams = serde_json::from_str(json).unwrap();
        assert_eq!((out.rgb_red, out.rgb_green, out.rgb_blue), (255, 128, 0));
    }

    #[test]
    fn test_output_missing_fields_take_defaults() {
        let out: OutputParams = serde_json::from_str(r#"{"comeOut":true}"#).unwrap();
        assert!(out.come_out);
        assert_eq!(out.rgb_red, OutputParams::default().rgb_red);
    }

    #[test]
    fn test_unknown_area_is_untouched() {
        let json = r#"{"distance":30,"force":10,"motion":0,"temperature":20,"areaTouched":"tail"}"#;
        let env: Environment = serde_json::from_str(json).unwrap();
        assert_eq!(env.area_touched, AreaTouched::None);
        assert!("tail".parse::<AreaTouched>().is_err());
    }
}
