//! Sentiment signal model produced by the news classifier.

use serde::{Deserialize, Serialize};

/// Direction of a sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// One sentiment reading for a symbol over a news window.
///
/// Produced externally once per cycle and treated as an immutable input
/// by the decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Classifier confidence in the label, in [0, 1]
    pub probability: f64,

    pub label: SentimentLabel,
}

impl Signal {
    /// A neutral signal with zero confidence, used when no news is
    /// available for the window.
    pub fn neutral() -> Self {
        Self {
            probability: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}
