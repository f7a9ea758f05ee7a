use crate::emotion::{ClassificationResult, EmotionLexicon, TextEmotion};

const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Keyword match counts for one input, in lexicon order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoodScoreVector {
    scores: Vec<(TextEmotion, usize)>,
    total: usize,
}

impl MoodScoreVector {
    pub fn get(&self, emotion: TextEmotion) -> usize {
        self.scores
            .iter()
            .find(|(e, _)| *e == emotion)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextEmotion, usize)> + '_ {
        self.scores.iter().copied()
    }

    /// Highest count; the earliest label wins a tie. `None` when nothing matched.
    pub fn top(&self) -> Option<(TextEmotion, usize)> {
        if self.total == 0 {
            return None;
        }
        let mut best: Option<(TextEmotion, usize)> = None;
        for (emotion, count) in self.iter() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((emotion, count)),
            }
        }
        best
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextEmotionScorer {
    lexicon: EmotionLexicon,
}

impl TextEmotionScorer {
    pub fn new(lexicon: EmotionLexicon) -> Self {
        Self { lexicon }
    }

    pub fn mood_scores(&self, text: &str) -> MoodScoreVector {
        let normalized = text.trim().to_lowercase();

        let mut total = 0;
        let scores = self
            .lexicon
            .entries()
            .iter()
            .map(|entry| {
                let count = entry
                    .keywords
                    .iter()
                    .filter(|k| normalized.contains(k.as_str()))
                    .count();
                total += count;
                (entry.emotion, count)
            })
            .collect();

        MoodScoreVector { scores, total }
    }

    pub fn score(&self, text: &str) -> ClassificationResult<TextEmotion> {
        let scores = self.mood_scores(text);

        let result = match scores.top() {
            None => ClassificationResult::new(TextEmotion::Neutral, NEUTRAL_CONFIDENCE),
            Some((emotion, count)) => {
                let share = count as f64 / scores.total() as f64;
                let confidence = round_to_hundredths(0.5 + share * 0.5).min(1.0);
                ClassificationResult::new(emotion, confidence)
            }
        };

        tracing::debug!(
            emotion = %result.emotion,
            confidence = result.confidence,
            total_score = scores.total(),
            "text scored"
        );
        result
    }
}

// Rounds the exact binary value, so 0.925 (stored just above) gives 0.93 and
// the exact tie 0.625 goes to the even neighbour 0.62. Scaling by 100 first
// would move values across the halfway point.
fn round_to_hundredths(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
