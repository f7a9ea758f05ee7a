//! Request-level operations: text analysis, audio analysis and liveness.
//!
//! Audio analysis is a single failure boundary. Decoding, feature extraction
//! and classification errors all surface as [`AnalysisError`] so the HTTP
//! layer can answer with an `{"error": ...}` payload instead of failing the
//! request.

use crate::decode::{AudioDecoder, DecodeError, SymphoniaAudioDecoder};
use crate::emotion::{
    AudioEmotion, AudioEmotionClassifier, ClassificationResult, EmotionError, TextEmotion,
    TextEmotionScorer,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    DecodeFailure(#[from] DecodeError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<EmotionError> for AnalysisError {
    fn from(err: EmotionError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioAnalysis {
    pub filename: String,
    #[serde(flatten)]
    pub result: ClassificationResult<AudioEmotion>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&AnalysisError> for ErrorBody {
    fn from(err: &AnalysisError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Clone)]
pub struct EmotionService {
    scorer: TextEmotionScorer,
    classifier: AudioEmotionClassifier,
    decoder: Arc<dyn AudioDecoder>,
}

impl EmotionService {
    pub fn new(scorer: TextEmotionScorer, decoder: Arc<dyn AudioDecoder>) -> Self {
        Self {
            scorer,
            classifier: AudioEmotionClassifier::new(),
            decoder,
        }
    }

    pub fn analyze_text(&self, text: &str) -> ClassificationResult<TextEmotion> {
        self.scorer.score(text)
    }

    pub fn analyze_audio(
        &self,
        bytes: Bytes,
        filename: &str,
    ) -> Result<AudioAnalysis, AnalysisError> {
        let hint = (!filename.is_empty()).then_some(filename);
        let audio = self.decoder.decode(bytes, hint)?;
        let result = self.classifier.classify(&audio.samples)?;

        Ok(AudioAnalysis {
            filename: filename.to_owned(),
            result,
        })
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_owned(),
        }
    }
}

impl Default for EmotionService {
    fn default() -> Self {
        Self::new(
            TextEmotionScorer::default(),
            Arc::new(SymphoniaAudioDecoder::new()),
        )
    }
}
