//! Presentation rules for scores.
//!
//! Rule cards and the headline score share the same three tiers; the
//! headline additionally gets a verdict with finer steps.

use serde::Serialize;

/// Colour band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    /// 80 and above.
    Good,
    /// 60 up to 80.
    Fair,
    /// Below 60.
    Poor,
}

impl ScoreTier {
    /// Tier for a 0-100 score.
    #[must_use]
    pub fn of(score: f32) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Status marker shown next to rule scores.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Good => "✅",
            Self::Fair => "⚠️",
            Self::Poor => "❌",
        }
    }
}

/// Headline verdict for the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// 85 and above.
    Excellent,
    /// 70 up to 85.
    Good,
    /// 50 up to 70.
    NotBad,
    /// Below 50.
    NeedsImprovement,
}

impl Verdict {
    /// Verdict for a 0-100 total score.
    #[must_use]
    pub fn of(score: f32) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::NotBad
        } else {
            Self::NeedsImprovement
        }
    }

    /// Text shown under the headline score.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent!",
            Self::Good => "Good!",
            Self::NotBad => "Not bad",
            Self::NeedsImprovement => "Needs improvement",
        }
    }
}

/// Headline score, one decimal.
#[must_use]
pub fn format_total(score: f32) -> String {
    format!("{score:.1}")
}

/// Rule score, no decimals.
#[must_use]
pub fn format_rule(score: f32) -> String {
    format!("{score:.0}")
}
