//! Integration tests for the mood and behaviour engine.
//!
//! These walk the public API over a grid of personalities and environments
//! and check the properties every derivation must keep.

use feelien::errors::{FeelienError, Result};
use feelien::mood::{dominant_emotion, puff_state, score_all, tail_swing, Emotion, MoodReport};
use feelien::types::{Environment, Personality, Trait};

fn grid() -> Vec<Personality> {
    let steps = [0.0, 35.0, 70.0, 100.0];
    let mut out = Vec::new();
    for &a in &steps {
        for &b in &steps {
            for &c in &steps {
                out.push(Personality {
                    happiness: a,
                    energy: b,
                    trust: c,
                    anger: 100.0 - a,
                    patience: b,
                    sociability: c,
                    curiosity: (a + b) / 2.0,
                    confusion: (b + c) / 2.0,
                    intelligence: 100.0 - c,
                });
            }
        }
    }
    out
}

// ==================== Emotion Tests ====================

#[test]
fn test_dominant_is_always_a_known_emotion() -> Result<()> {
    for p in grid() {
        let dominant = dominant_emotion(&p)?;
        assert!(Emotion::ALL.contains(&dominant.name));
        assert_eq!(dominant.emoji, dominant.name.glyph());
    }
    Ok(())
}

#[test]
fn test_dominant_has_the_top_score() -> Result<()> {
    for p in grid() {
        let dominant = dominant_emotion(&p)?;
        let scores = score_all(&p)?;
        for info in &scores {
            assert!(info.score <= dominant.score);
        }
        // ties resolve to the first declared emotion
        let first_max = scores
            .iter()
            .find(|info| info.score == dominant.score)
            .map(|info| info.name);
        assert_eq!(first_max, Some(dominant.name));
    }
    Ok(())
}

#[test]
fn test_scores_stay_on_scale() -> Result<()> {
    for p in grid() {
        for info in score_all(&p)? {
            assert!((0.0..=100.0).contains(&info.score), "{info:?}");
        }
    }
    Ok(())
}

#[test]
fn test_bright_personality() -> Result<()> {
    let p = Personality {
        happiness: 90.0,
        trust: 80.0,
        energy: 30.0,
        ..Personality::default()
    };
    let scores = score_all(&p)?;
    assert_eq!(scores[0].name, Emotion::Happy);
    assert!((scores[0].score - 75.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_everything_high_is_curious() -> Result<()> {
    // happy = curious = 100 would tie; trust 0 breaks it
    let p = Personality {
        trust: 0.0,
        ..Personality::uniform(100.0)
    };
    assert_eq!(dominant_emotion(&p)?.name, Emotion::Curious);
    Ok(())
}

#[test]
fn test_out_of_range_trait_rejected() {
    for name in Trait::ALL {
        let mut p = Personality::default();
        p.set(name, 100.5);
        let err = dominant_emotion(&p).unwrap_err();
        assert!(
            matches!(err, FeelienError::InvalidParameter { field, .. } if field == name.name()),
            "{name}: {err}"
        );
    }
}

// ==================== Behaviour Tests ====================

#[test]
fn test_strong_touch_never_deflated() -> Result<()> {
    let env = Environment {
        force: 85.0,
        ..Environment::default()
    };
    for p in grid() {
        assert!(!puff_state(&p, &env)?);
    }
    Ok(())
}

#[test]
fn test_swing_bounds() -> Result<()> {
    for force in [0.0, 10.0, 50.0, 100.0] {
        let env = Environment {
            force,
            ..Environment::default()
        };
        for p in grid() {
            let swing = tail_swing(&p, &env)?;
            assert!(swing.step_degrees >= 10.0);
            assert!(swing.step_degrees <= 90.0);
            assert_eq!(swing.step_degrees, swing.step_degrees.floor());
            assert!((0.0..=2.0).contains(&swing.delay_secs));
        }
    }
    Ok(())
}

#[test]
fn test_more_force_never_widens_swing() -> Result<()> {
    for p in grid() {
        let mut last = f64::INFINITY;
        for force in [0.0, 25.0, 50.0, 75.0, 100.0] {
            let env = Environment {
                force,
                ..Environment::default()
            };
            let step = tail_swing(&p, &env)?.step_degrees;
            assert!(step <= last);
            last = step;
        }
    }
    Ok(())
}

// ==================== Report Tests ====================

#[test]
fn test_report_is_pure() -> Result<()> {
    let env = Environment {
        distance: 12.0,
        force: 40.0,
        motion: 15.0,
        temperature: 28.0,
        ..Environment::default()
    };
    for p in grid() {
        assert_eq!(MoodReport::evaluate(&p, &env)?, MoodReport::evaluate(&p, &env)?);
    }
    Ok(())
}

#[test]
fn test_report_rejects_bad_environment() {
    let env = Environment {
        distance: -1.0,
        ..Environment::default()
    };
    assert!(MoodReport::evaluate(&Personality::default(), &env).is_err());
}
