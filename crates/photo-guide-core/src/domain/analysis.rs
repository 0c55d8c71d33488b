//! Composition analysis returned by `/analyze-composition`.

use serde::{Deserialize, Serialize};

use super::{Genre, ValueError};

/// Lowest score the service produces.
pub const MIN_SCORE: f32 = 0.0;
/// Highest score the service produces.
pub const MAX_SCORE: f32 = 100.0;

/// Score for a single composition rule (rule of thirds, horizon, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    /// Rule name as shown to the user.
    pub name: String,
    /// Score from 0 to 100.
    pub score: f32,
    /// What the rule found.
    pub message: String,
    /// How to improve.
    pub suggestion: String,
}

/// Complete analysis for one uploaded photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionAnalysis {
    /// Weighted score across all rules, 0 to 100.
    pub total_score: f32,
    /// Genre the rules were weighted for.
    pub genre: Genre,
    /// Per-rule breakdown.
    pub rules: Vec<RuleScore>,
    /// Multi-line coaching text.
    pub coach_guide: String,
    /// Suggested prompt for the image generator.
    pub expert_prompt: String,
    /// Server-side extras (file id, original filename, image facts).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl CompositionAnalysis {
    /// Checks that every score is a finite number in `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::ScoreOutOfRange`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValueError> {
        check_score("total_score", self.total_score)?;
        for rule in &self.rules {
            check_score(&rule.name, rule.score)?;
        }
        Ok(())
    }

    /// Looks up a string entry in the metadata map.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }
}

fn check_score(field: &str, value: f32) -> Result<(), ValueError> {
    if value.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&value) {
        Ok(())
    } else {
        Err(ValueError::ScoreOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}
