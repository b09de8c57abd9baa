/// Sentiment scoring capability
///
/// The pipeline only depends on the `SentimentScorer` contract: a bounded
/// finite score in [-1, 1] for any content, deterministic for a given
/// input. Production deployments plug a real model in behind the same
/// trait; `LexiconScorer` is the built-in word-list implementation.
use crate::error::ScoreError;

/// Lower bound of the scorer contract.
pub const SCORE_MIN: f64 = -1.0;
/// Upper bound of the scorer contract.
pub const SCORE_MAX: f64 = 1.0;

pub trait SentimentScorer {
    /// Score a post's text. Must return a finite value in
    /// [`SCORE_MIN`, `SCORE_MAX`]; anything else is treated by the
    /// pipeline as a per-post scoring failure.
    fn score(&self, content: &str) -> Result<f64, ScoreError>;
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "love", "excellent", "awesome", "amazing", "happy",
    "best", "beautiful", "fantastic", "nice", "perfect", "wonderful",
    "cool", "win", "winning", "enjoy", "recommend", "impressive", "solid",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "hate", "awful", "worst", "horrible", "sad",
    "angry", "broken", "disappointing", "disappointed", "scam", "ugly",
    "fail", "failure", "poor", "annoying", "useless", "garbage", "avoid",
];

/// Word-list sentiment scorer.
///
/// Score is the hit ratio `(positive - negative) / (positive + negative)`
/// over the post's tokens, `0.0` when no lexicon word matches. Always
/// finite and within [-1, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, content: &str) -> Result<f64, ScoreError> {
        let mut positive = 0usize;
        let mut negative = 0usize;

        for token in content
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            if POSITIVE_WORDS.contains(&token.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&token.as_str()) {
                negative += 1;
            }
        }

        let hits = positive + negative;
        if hits == 0 {
            return Ok(0.0);
        }

        Ok((positive as f64 - negative as f64) / hits as f64)
    }
}
