use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Scores strictly beyond this magnitude are a strong lean.
pub const STRONG_LEAN_THRESHOLD: f64 = 3.0;

/// Display classification of a bias score.
///
/// Positive scores lean right, negative scores lean left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasBand {
    /// `score > 3`
    StrongRight,
    /// `0 < score <= 3`
    ModerateRight,
    /// `score == 0`
    Neutral,
    /// `-3 <= score < 0`
    ModerateLeft,
    /// `score < -3`
    StrongLeft,
}

impl BiasBand {
    /// Classifies a score. Pure function of `score`; NaN counts as neutral.
    pub fn from_score(score: f64) -> Self {
        if score > STRONG_LEAN_THRESHOLD {
            BiasBand::StrongRight
        } else if score > 0.0 {
            BiasBand::ModerateRight
        } else if score < -STRONG_LEAN_THRESHOLD {
            BiasBand::StrongLeft
        } else if score < 0.0 {
            BiasBand::ModerateLeft
        } else {
            BiasBand::Neutral
        }
    }

    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            BiasBand::StrongRight => "Strong right lean",
            BiasBand::ModerateRight => "Moderate right lean",
            BiasBand::Neutral => "Neutral",
            BiasBand::ModerateLeft => "Moderate left lean",
            BiasBand::StrongLeft => "Strong left lean",
        }
    }
}

impl fmt::Display for BiasBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sentiment of the analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// In `[-1, 1]`.
    pub polarity: f64,
    /// In `[0, 1]`.
    pub subjectivity: f64,
}

impl Sentiment {
    /// Builds a sentiment, clamping both components into their ranges.
    /// NaN components become 0.
    pub fn new(polarity: f64, subjectivity: f64) -> Self {
        let clamped = Self {
            polarity: clamp_component(polarity, -1.0, 1.0),
            subjectivity: clamp_component(subjectivity, 0.0, 1.0),
        };
        if clamped.polarity.to_bits() != polarity.to_bits()
            || clamped.subjectivity.to_bits() != subjectivity.to_bits()
        {
            tracing::warn!(polarity, subjectivity, "Sentiment out of range, clamped");
        }
        clamped
    }
}

fn clamp_component(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

/// The populated half of a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasScore {
    /// Directional score on an open scale.
    pub score: f64,
    /// Level string as reported by the service.
    pub level: String,
    /// Client-side banding of `score`.
    pub band: BiasBand,
    /// Phrases that contributed to the score. May be empty.
    pub trigger_phrases: BTreeSet<String>,
    /// Absent when the service did not report one.
    pub sentiment: Option<Sentiment>,
}

/// Either a score or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum BiasOutcome {
    /// The service produced an analysis.
    Scored(BiasScore),
    /// The request failed; `error` is shown to the user.
    Failed {
        /// Human-readable failure.
        error: String,
    },
}

/// Result of one bias analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    /// The user utterance that was analyzed.
    pub analyzed_text: String,
    /// Score or error.
    pub outcome: BiasOutcome,
    /// When the report was produced.
    pub created_at: DateTime<Utc>,
}

impl BiasReport {
    /// A successful report. The band is derived from `score`.
    pub fn scored(
        analyzed_text: impl Into<String>,
        score: f64,
        level: impl Into<String>,
        trigger_phrases: impl IntoIterator<Item = String>,
        sentiment: Option<Sentiment>,
    ) -> Self {
        Self {
            analyzed_text: analyzed_text.into(),
            outcome: BiasOutcome::Scored(BiasScore {
                score,
                level: level.into(),
                band: BiasBand::from_score(score),
                trigger_phrases: trigger_phrases.into_iter().collect(),
                sentiment,
            }),
            created_at: Utc::now(),
        }
    }

    /// An error-bearing report.
    pub fn failed(analyzed_text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            analyzed_text: analyzed_text.into(),
            outcome: BiasOutcome::Failed {
                error: error.into(),
            },
            created_at: Utc::now(),
        }
    }

    /// The score half, if the analysis succeeded.
    pub fn score(&self) -> Option<&BiasScore> {
        match &self.outcome {
            BiasOutcome::Scored(score) => Some(score),
            BiasOutcome::Failed { .. } => None,
        }
    }

    /// The error text, if the analysis failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BiasOutcome::Failed { error } => Some(error),
            BiasOutcome::Scored(_) => None,
        }
    }

    /// Band of the score, if any.
    pub fn band(&self) -> Option<BiasBand> {
        self.score().map(|s| s.band)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(BiasBand::from_score(4.0), BiasBand::StrongRight);
        assert_eq!(BiasBand::from_score(3.0), BiasBand::ModerateRight);
        assert_eq!(BiasBand::from_score(1.0), BiasBand::ModerateRight);
        assert_eq!(BiasBand::from_score(0.0), BiasBand::Neutral);
        assert_eq!(BiasBand::from_score(-1.0), BiasBand::ModerateLeft);
        assert_eq!(BiasBand::from_score(-3.0), BiasBand::ModerateLeft);
        assert_eq!(BiasBand::from_score(-5.0), BiasBand::StrongLeft);
    }

    #[test]
    fn test_band_fractional_scores() {
        assert_eq!(BiasBand::from_score(3.01), BiasBand::StrongRight);
        assert_eq!(BiasBand::from_score(0.1), BiasBand::ModerateRight);
        assert_eq!(BiasBand::from_score(-0.1), BiasBand::ModerateLeft);
        assert_eq!(BiasBand::from_score(-3.5), BiasBand::StrongLeft);
        assert_eq!(BiasBand::from_score(f64::NAN), BiasBand::Neutral);
    }

    #[test]
    fn test_sentiment_clamped() {
        let s = Sentiment::new(1.5, -0.2);
        assert_eq!(s.polarity, 1.0);
        assert_eq!(s.subjectivity, 0.0);
        let s = Sentiment::new(-0.4, 0.6);
        assert_eq!(s.polarity, -0.4);
        assert_eq!(s.subjectivity, 0.6);
    }

    #[test]
    fn test_sentiment_nan_becomes_zero() {
        let s = Sentiment::new(f64::NAN, f64::NAN);
        assert_eq!(s.polarity, 0.0);
        assert_eq!(s.subjectivity, 0.0);
        let s = Sentiment::new(0.5, f64::NAN);
        assert_eq!(s.polarity, 0.5);
        assert_eq!(s.subjectivity, 0.0);
    }

    #[test]
    fn test_scored_report_exclusive_fields() {
        let report = BiasReport::scored(
            "maga rally",
            4.2,
            "Right",
            vec!["maga".to_string(), "maga".to_string()],
            None,
        );
        assert!(report.error().is_none());
        let score = report.score().unwrap();
        assert_eq!(score.band, BiasBand::StrongRight);
        assert_eq!(score.trigger_phrases.len(), 1);
        assert!(score.sentiment.is_none());
    }

    #[test]
    fn test_failed_report_exclusive_fields() {
        let report = BiasReport::failed("text", "service unavailable");
        assert!(report.score().is_none());
        assert!(report.band().is_none());
        assert_eq!(report.error(), Some("service unavailable"));
    }
}
