mod audio;
mod lexicon;
mod text;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use audio::{rms, zcr, AcousticFeatures, AudioEmotionClassifier};
pub use lexicon::{EmotionLexicon, LexiconEntry, LexiconError};
pub use text::{MoodScoreVector, TextEmotionScorer};

/// Labels produced by the keyword scorer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TextEmotion {
    Happy,
    Sad,
    Angry,
    Anxious,
    Curious,
    Calm,
    Neutral,
}

impl TextEmotion {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Anxious => "anxious",
            Self::Curious => "curious",
            Self::Calm => "calm",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for TextEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels produced by the acoustic threshold cascade.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AudioEmotion {
    Energetic,
    Sad,
    Agitated,
    Calm,
}

impl AudioEmotion {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Energetic => "energetic",
            Self::Sad => "sad",
            Self::Agitated => "agitated",
            Self::Calm => "calm",
        }
    }
}

impl fmt::Display for AudioEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label plus a confidence that is always within `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult<E> {
    pub emotion: E,
    pub confidence: f64,
}

impl<E> ClassificationResult<E> {
    pub fn new(emotion: E, confidence: f64) -> Self {
        Self {
            emotion,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmotionError {
    #[error("sample sequence is empty")]
    EmptySamples,

    #[error("acoustic features are not finite")]
    NonFiniteFeatures,
}
