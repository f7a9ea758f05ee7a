use crate::emotion::{AudioEmotion, ClassificationResult, EmotionError};
use serde::{Deserialize, Serialize};

const ENERGETIC_RMS: f64 = 0.08;
const QUIET_RMS: f64 = 0.02;
const AGITATED_ZCR: f64 = 0.2;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AcousticFeatures {
    pub rms: f64,
    pub zcr: f64,
}

impl AcousticFeatures {
    pub fn from_samples(samples: &[f32]) -> Result<Self, EmotionError> {
        let features = Self {
            rms: rms(samples)?,
            zcr: zcr(samples)?,
        };
        if !features.rms.is_finite() || !features.zcr.is_finite() {
            return Err(EmotionError::NonFiniteFeatures);
        }
        Ok(features)
    }
}

/// Root-mean-square energy.
pub fn rms(samples: &[f32]) -> Result<f64, EmotionError> {
    if samples.is_empty() {
        return Err(EmotionError::EmptySamples);
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s).powi(2)).sum();
    Ok((sum / samples.len() as f64).sqrt())
}

/// Fraction of adjacent sample pairs whose sign differs. Zero counts as positive.
pub fn zcr(samples: &[f32]) -> Result<f64, EmotionError> {
    if samples.is_empty() {
        return Err(EmotionError::EmptySamples);
    }
    if samples.len() == 1 {
        return Ok(0.0);
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    Ok(crossings as f64 / (samples.len() - 1) as f64)
}

struct Rule {
    matches: fn(&AcousticFeatures) -> bool,
    emotion: AudioEmotion,
    confidence: f64,
}

fn is_loud(f: &AcousticFeatures) -> bool {
    f.rms > ENERGETIC_RMS
}

fn is_quiet(f: &AcousticFeatures) -> bool {
    f.rms < QUIET_RMS
}

fn is_noisy(f: &AcousticFeatures) -> bool {
    f.zcr > AGITATED_ZCR
}

fn always(_: &AcousticFeatures) -> bool {
    true
}

// Evaluated top to bottom; the first match wins.
static RULES: [Rule; 4] = [
    Rule {
        matches: is_loud,
        emotion: AudioEmotion::Energetic,
        confidence: 0.75,
    },
    Rule {
        matches: is_quiet,
        emotion: AudioEmotion::Sad,
        confidence: 0.8,
    },
    Rule {
        matches: is_noisy,
        emotion: AudioEmotion::Agitated,
        confidence: 0.65,
    },
    Rule {
        matches: always,
        emotion: AudioEmotion::Calm,
        confidence: 0.9,
    },
];

#[derive(Clone, Copy, Debug, Default)]
pub struct AudioEmotionClassifier;

impl AudioEmotionClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(
        &self,
        samples: &[f32],
    ) -> Result<ClassificationResult<AudioEmotion>, EmotionError> {
        let features = AcousticFeatures::from_samples(samples)?;
        let result = self.classify_features(&features);

        tracing::debug!(
            rms = features.rms,
            zcr = features.zcr,
            emotion = %result.emotion,
            confidence = result.confidence,
            "audio classified"
        );
        Ok(result)
    }

    pub fn classify_features(
        &self,
        features: &AcousticFeatures,
    ) -> ClassificationResult<AudioEmotion> {
        let rule = RULES
            .iter()
            .find(|rule| (rule.matches)(features))
            .unwrap_or(&RULES[RULES.len() - 1]);
        ClassificationResult::new(rule.emotion, rule.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(rms: f64, zcr: f64) -> AcousticFeatures {
        AcousticFeatures { rms, zcr }
    }

    #[test]
    fn rms_of_constant_signal() {
        let v = rms(&[0.5, -0.5, 0.5, -0.5]).unwrap();
        assert!((v - 0.5).abs() < 1e-9);
        assert_eq!(rms(&[0.0; 16]).unwrap(), 0.0);
    }

    #[test]
    fn zcr_counts_sign_changes_between_neighbours() {
        assert_eq!(zcr(&[1.0, -1.0, 1.0, -1.0, 1.0]).unwrap(), 1.0);
        assert_eq!(zcr(&[0.1, 0.2, 0.3]).unwrap(), 0.0);
        assert!((zcr(&[0.1, -0.1, -0.2, -0.3, 0.4]).unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(zcr(&[0.7]).unwrap(), 0.0);
    }

    #[test]
    fn zero_counts_as_positive() {
        assert_eq!(zcr(&[0.0, 0.5, 0.0]).unwrap(), 0.0);
        assert_eq!(zcr(&[-0.5, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn empty_samples_are_rejected() {
        assert_eq!(rms(&[]), Err(EmotionError::EmptySamples));
        assert_eq!(zcr(&[]), Err(EmotionError::EmptySamples));
        assert_eq!(
            AudioEmotionClassifier::new().classify(&[]),
            Err(EmotionError::EmptySamples)
        );
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let err = AcousticFeatures::from_samples(&[0.1, f32::NAN, 0.2]).unwrap_err();
        assert_eq!(err, EmotionError::NonFiniteFeatures);
    }

    #[test]
    fn cascade_thresholds() {
        let c = AudioEmotionClassifier::new();

        let r = c.classify_features(&features(0.2, 0.0));
        assert_eq!((r.emotion, r.confidence), (AudioEmotion::Energetic, 0.75));

        let r = c.classify_features(&features(0.01, 0.0));
        assert_eq!((r.emotion, r.confidence), (AudioEmotion::Sad, 0.8));

        let r = c.classify_features(&features(0.05, 0.3));
        assert_eq!((r.emotion, r.confidence), (AudioEmotion::Agitated, 0.65));

        let r = c.classify_features(&features(0.05, 0.1));
        assert_eq!((r.emotion, r.confidence), (AudioEmotion::Calm, 0.9));
    }

    #[test]
    fn boundaries_are_strict() {
        let c = AudioEmotionClassifier::new();
        assert_eq!(c.classify_features(&features(0.08, 0.0)).emotion, AudioEmotion::Calm);
        assert_eq!(c.classify_features(&features(0.08, 0.5)).emotion, AudioEmotion::Agitated);
        assert_eq!(c.classify_features(&features(0.02, 0.0)).emotion, AudioEmotion::Calm);
        assert_eq!(c.classify_features(&features(0.05, 0.2)).emotion, AudioEmotion::Calm);
    }

    #[test]
    fn energy_rules_run_before_zero_crossing_rule() {
        let c = AudioEmotionClassifier::new();
        assert_eq!(c.classify_features(&features(0.01, 0.5)).emotion, AudioEmotion::Sad);
        assert_eq!(c.classify_features(&features(0.3, 0.9)).emotion, AudioEmotion::Energetic);
    }

    #[test]
    fn classify_from_waveform() {
        let c = AudioEmotionClassifier::new();

        // Alternating signs: zcr 1.0, rms 0.05.
        let buzzy: Vec<f32> = (0..400).map(|i| if i % 2 == 0 { 0.05 } else { -0.05 }).collect();
        assert_eq!(c.classify(&buzzy).unwrap().emotion, AudioEmotion::Agitated);

        // Slow square wave: zcr 0.01, rms 0.05.
        let smooth: Vec<f32> = (0..400)
            .map(|i| if (i / 100) % 2 == 0 { 0.05 } else { -0.05 })
            .collect();
        assert_eq!(c.classify(&smooth).unwrap().emotion, AudioEmotion::Calm);

        let loud = vec![0.5f32; 100];
        assert_eq!(c.classify(&loud).unwrap().emotion, AudioEmotion::Energetic);

        let quiet = vec![0.001f32; 100];
        assert_eq!(c.classify(&quiet).unwrap().emotion, AudioEmotion::Sad);
    }

    #[test]
    fn classification_is_idempotent() {
        let c = AudioEmotionClassifier::new();
        let samples: Vec<f32> = (0..256).map(|i| ((i as f32) * 0.3).sin() * 0.04).collect();
        assert_eq!(c.classify(&samples).unwrap(), c.classify(&samples).unwrap());
    }
}
