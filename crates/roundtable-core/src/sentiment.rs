//! Lexicon-based sentiment scoring.
//!
//! Maps generated text to a signed polarity value and a label, optionally
//! skewed by a persona's sentiment bias. Scoring is pure and deterministic:
//! the same text and bias always produce the same score, and scoring never
//! fails; empty or unmatchable text yields a neutral score.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentiment classification of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// A scored piece of text: the thresholded label plus the signed value
/// in `[-1.0, 1.0]` it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub value: f64,
}

impl SentimentScore {
    /// The neutral score returned for empty text.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            value: 0.0,
        }
    }
}

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good",
        "great",
        "excellent",
        "amazing",
        "wonderful",
        "fantastic",
        "love",
        "like",
        "enjoy",
        "brilliant",
        "outstanding",
        "perfect",
        "impressive",
        "innovative",
        "exciting",
        "valuable",
        "effective",
        "successful",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad",
        "terrible",
        "awful",
        "horrible",
        "hate",
        "dislike",
        "disgusting",
        "worst",
        "disappointing",
        "useless",
        "failed",
        "broken",
        "wrong",
        "problem",
        "issue",
        "concerning",
        "problematic",
        "challenging",
        "difficult",
        "expensive",
    ]
    .into_iter()
    .collect()
});

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z']+").expect("valid token regex"));

/// How strongly each lexicon hit beyond the first moves the polarity.
const HIT_WEIGHT: f64 = 0.1;

/// Baseline polarity once one side of the lexicon dominates.
const BASE_POLARITY: f64 = 0.3;

/// Fraction of the persona bias blended into the final value.
const BIAS_WEIGHT: f64 = 0.5;

/// Scores `text` against the built-in lexicon and blends in `bias`.
///
/// `bias` is the persona's disposition in `[-1.0, 1.0]`; it shifts the raw
/// polarity additively (scaled by [`BIAS_WEIGHT`]) before clamping, which is
/// how two personas given identical text can land on different labels.
///
/// The label threshold sits exactly at zero: any positive value is
/// `Positive`, any negative value is `Negative`, zero is `Neutral`.
///
/// Empty or whitespace-only text returns the neutral score unconditionally,
/// bias included; an absent response carries no sentiment.
pub fn score(text: &str, bias: f64) -> SentimentScore {
    if text.trim().is_empty() {
        return SentimentScore::neutral();
    }

    let lower = text.to_lowercase();
    let mut positive = 0i64;
    let mut negative = 0i64;
    for token in WORD_TOKEN.find_iter(&lower) {
        let word = token.as_str();
        if POSITIVE_WORDS.contains(word) {
            positive += 1;
        }
        if NEGATIVE_WORDS.contains(word) {
            negative += 1;
        }
    }

    let base = if positive > negative {
        BASE_POLARITY + (positive - negative) as f64 * HIT_WEIGHT
    } else if negative > positive {
        -BASE_POLARITY - (negative - positive) as f64 * HIT_WEIGHT
    } else {
        0.0
    };

    let value = (base + bias * BIAS_WEIGHT).clamp(-1.0, 1.0);
    SentimentScore {
        label: label_for(value),
        value,
    }
}

fn label_for(value: f64) -> SentimentLabel {
    if value > 0.0 {
        SentimentLabel::Positive
    } else if value < 0.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral_regardless_of_bias() {
        let scored = score("", 0.9);
        assert_eq!(scored.label, SentimentLabel::Neutral);
        assert_eq!(scored.value, 0.0);

        let scored = score("   \n\t", -0.9);
        assert_eq!(scored.label, SentimentLabel::Neutral);
        assert_eq!(scored.value, 0.0);
    }

    #[test]
    fn positive_words_produce_positive_label() {
        let scored = score("This is a great and innovative concept, I love it.", 0.0);
        assert_eq!(scored.label, SentimentLabel::Positive);
        assert!(scored.value > 0.3);
    }

    #[test]
    fn negative_words_produce_negative_label() {
        let scored = score("The pricing is problematic and the rollout looks broken.", 0.0);
        assert_eq!(scored.label, SentimentLabel::Negative);
        assert!(scored.value < -0.3);
    }

    #[test]
    fn balanced_text_without_bias_is_neutral() {
        let scored = score("It is great in theory but the cost is problematic.", 0.0);
        assert_eq!(scored.label, SentimentLabel::Neutral);
        assert_eq!(scored.value, 0.0);
    }

    #[test]
    fn opposing_biases_flip_labels_on_neutral_text() {
        let text = "The panel reviewed the product announcement today.";
        let optimist = score(text, 0.8);
        let skeptic = score(text, -0.8);
        assert_eq!(optimist.label, SentimentLabel::Positive);
        assert_eq!(skeptic.label, SentimentLabel::Negative);
        assert_ne!(optimist.label, skeptic.label);
    }

    #[test]
    fn value_is_clamped_to_unit_range() {
        let euphoric = score(
            "great excellent amazing wonderful fantastic brilliant outstanding perfect",
            1.0,
        );
        assert_eq!(euphoric.value, 1.0);

        let hostile = score(
            "terrible awful horrible disgusting worst disappointing useless broken",
            -1.0,
        );
        assert_eq!(hostile.value, -1.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let text = "An impressive launch, though the price point is concerning.";
        let first = score(text, 0.2);
        let second = score(text, 0.2);
        assert_eq!(first, second);
    }

    #[test]
    fn tokens_match_whole_words_only() {
        // "unlike" must not count as a hit for "like".
        let scored = score("Unlike last year, nothing stands out.", 0.0);
        assert_eq!(scored.label, SentimentLabel::Neutral);
    }
}
