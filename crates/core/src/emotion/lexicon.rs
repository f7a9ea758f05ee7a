use crate::emotion::TextEmotion;
use std::collections::HashSet;

const BUILTIN: &[(TextEmotion, &[&str])] = &[
    (
        TextEmotion::Happy,
        &[
            "vui", "tuyệt", "tốt", "hạnh phúc", "yeah", "ngon", "sung sướng", "thoải mái", "haha",
            "hehe", "😂", "=)))",
        ],
    ),
    (
        TextEmotion::Sad,
        &[
            "buồn", "chán", "mệt", "tuyệt vọng", "cô đơn", "khóc", "đau", "stress", "mệt mỏi",
            "buồn bã", "u ám", "😔",
        ],
    ),
    (
        TextEmotion::Angry,
        &["giận", "bực", "phẫn nộ", "tức", "ghét", "cáu", "đáng ghét", "😡"],
    ),
    (
        TextEmotion::Anxious,
        &[
            "lo", "lo lắng", "bồn chồn", "hồi hộp", "áp lực", "bất an", "căng thẳng", "bất lực",
            "😟",
        ],
    ),
    (
        TextEmotion::Curious,
        &["sao", "tại sao", "làm sao", "thế nào", "gì", "?", "tìm hiểu", "🤔"],
    ),
    (
        TextEmotion::Calm,
        &["bình thường", "êm", "nhẹ nhàng", "bình yên", "ổn", "😌", "😐"],
    ),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexiconEntry {
    pub emotion: TextEmotion,
    pub keywords: Vec<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexiconError {
    #[error("`neutral` is the no-match fallback and cannot have keywords")]
    NeutralEntry,

    #[error("emotion `{0}` appears more than once")]
    DuplicateEmotion(TextEmotion),

    #[error("emotion `{0}` has an empty keyword")]
    EmptyKeyword(TextEmotion),
}

/// Ordered label to keyword table. Entry order decides ties when scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmotionLexicon {
    entries: Vec<LexiconEntry>,
}

impl EmotionLexicon {
    pub fn new(entries: Vec<LexiconEntry>) -> Result<Self, LexiconError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.emotion == TextEmotion::Neutral {
                return Err(LexiconError::NeutralEntry);
            }
            if !seen.insert(entry.emotion) {
                return Err(LexiconError::DuplicateEmotion(entry.emotion));
            }
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(LexiconError::EmptyKeyword(entry.emotion));
            }
            normalized.push(LexiconEntry {
                emotion: entry.emotion,
                keywords: entry.keywords.iter().map(|k| k.to_lowercase()).collect(),
            });
        }

        Ok(Self {
            entries: normalized,
        })
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(emotion, keywords)| LexiconEntry {
                emotion: *emotion,
                keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn emotions(&self) -> impl Iterator<Item = TextEmotion> + '_ {
        self.entries.iter().map(|e| e.emotion)
    }
}

impl Default for EmotionLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(emotion: TextEmotion, keywords: &[&str]) -> LexiconEntry {
        LexiconEntry {
            emotion,
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    #[test]
    fn builtin_order_is_fixed() {
        let order: Vec<_> = EmotionLexicon::builtin().emotions().collect();
        assert_eq!(
            order,
            vec![
                TextEmotion::Happy,
                TextEmotion::Sad,
                TextEmotion::Angry,
                TextEmotion::Anxious,
                TextEmotion::Curious,
                TextEmotion::Calm,
            ]
        );
    }

    #[test]
    fn builtin_passes_validation() {
        let builtin = EmotionLexicon::builtin();
        let rebuilt = EmotionLexicon::new(builtin.entries().to_vec()).expect("valid builtin");
        assert_eq!(rebuilt, builtin);
    }

    #[test]
    fn keywords_are_lowercased() {
        let lexicon = EmotionLexicon::new(vec![entry(TextEmotion::Happy, &["YEAH", "Vui"])])
            .expect("valid");
        assert_eq!(lexicon.entries()[0].keywords, vec!["yeah", "vui"]);
    }

    #[test]
    fn rejects_neutral_entry() {
        let err = EmotionLexicon::new(vec![entry(TextEmotion::Neutral, &["meh"])]).unwrap_err();
        assert_eq!(err, LexiconError::NeutralEntry);
    }

    #[test]
    fn rejects_duplicate_emotion() {
        let err = EmotionLexicon::new(vec![
            entry(TextEmotion::Sad, &["buồn"]),
            entry(TextEmotion::Sad, &["chán"]),
        ])
        .unwrap_err();
        assert_eq!(err, LexiconError::DuplicateEmotion(TextEmotion::Sad));
    }

    #[test]
    fn rejects_empty_keyword() {
        let err = EmotionLexicon::new(vec![entry(TextEmotion::Calm, &["ổn", "  "])]).unwrap_err();
        assert_eq!(err, LexiconError::EmptyKeyword(TextEmotion::Calm));
        assert!(err.to_string().contains("calm"));
    }
}
