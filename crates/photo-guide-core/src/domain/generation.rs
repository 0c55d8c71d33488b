//! Image regeneration request and response for `/generate-nanobanana`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValueError;

/// Shown when the service reports failure without a reason.
pub const DEFAULT_FAILURE_REASON: &str = "Something went wrong while generating the image.";

/// Style preset for the generator.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Subtle, true-to-life edits.
    #[default]
    Natural,
    /// Punchier colour and contrast.
    Vivid,
    /// Strong light and mood.
    Dramatic,
}

impl Style {
    /// All presets the service accepts.
    pub const ALL: [Self; 3] = [Self::Natural, Self::Vivid, Self::Dramatic];

    /// Wire value sent in the `style` form field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Vivid => "vivid",
            Self::Dramatic => "dramatic",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| ValueError::UnknownStyle(s.to_string()))
    }
}

/// How far the generator may move away from the original, `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Strength(f32);

impl Strength {
    /// Default modification strength.
    pub const DEFAULT: Self = Self(0.7);

    /// Creates a strength, rejecting values outside `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::StrengthOutOfRange`] for out-of-range or NaN input.
    pub fn new(value: f32) -> Result<Self, ValueError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValueError::StrengthOutOfRange(value))
        }
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to send alongside the original photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    /// Improvement instructions, usually the edited expert prompt.
    pub prompt: String,
    /// Style preset.
    pub style: Style,
    /// Modification strength.
    pub strength: Strength,
}

impl GenerationRequest {
    /// Builds a request, rejecting blank prompts.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EmptyPrompt`] when the prompt is empty or whitespace.
    pub fn new(
        prompt: impl Into<String>,
        style: Style,
        strength: Strength,
    ) -> Result<Self, ValueError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ValueError::EmptyPrompt);
        }
        Ok(Self {
            prompt,
            style,
            strength,
        })
    }
}

/// Response body of the generation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Whether the service produced something.
    pub success: bool,
    /// Location of the regenerated image, often relative to the server root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Textual advice returned when no image could be produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    /// Footnote accompanying `suggestions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Server-side extras.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// How a generation result should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome<'a> {
    /// A regenerated image is available for a before/after comparison.
    Image {
        /// Where to fetch it.
        url: &'a str,
    },
    /// No image, but the model returned advice.
    Suggestions {
        /// The advice text (may be empty).
        text: &'a str,
        /// Optional footnote.
        note: Option<&'a str>,
    },
    /// The service reported failure.
    Failed {
        /// Reason for display.
        reason: &'a str,
    },
}

impl GenerationResult {
    /// Classifies the response for display.
    #[must_use]
    pub fn outcome(&self) -> GenerationOutcome<'_> {
        if !self.success {
            return GenerationOutcome::Failed {
                reason: self
                    .error
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or(DEFAULT_FAILURE_REASON),
            };
        }
        match self.image_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => GenerationOutcome::Image { url },
            None => GenerationOutcome::Suggestions {
                text: self.suggestions.as_deref().unwrap_or_default(),
                note: self.note.as_deref(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_bounds() {
        assert!(Strength::new(0.0).is_ok());
        assert!(Strength::new(1.0).is_ok());
        assert!(Strength::new(1.01).is_err());
        assert!(Strength::new(-0.1).is_err());
        assert!(Strength::new(f32::NAN).is_err());
        assert!((Strength::default().get() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_style_parse() {
        assert_eq!("VIVID".parse::<Style>().unwrap(), Style::Vivid);
        assert!("sepia".parse::<Style>().is_err());
        assert_eq!(Style::default(), Style::Natural);
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let err = GenerationRequest::new("   \n", Style::Natural, Strength::DEFAULT).unwrap_err();
        assert!(matches!(err, ValueError::EmptyPrompt));
    }

    #[test]
    fn test_outcome_image() {
        let result: GenerationResult =
            serde_json::from_str(r#"{"success": true, "image_url": "/outputs/x_output.jpg"}"#)
                .unwrap();
        assert_eq!(
            result.outcome(),
            GenerationOutcome::Image {
                url: "/outputs/x_output.jpg"
            }
        );
    }

    #[test]
    fn test_outcome_suggestions_without_image() {
        let result: GenerationResult = serde_json::from_str(
            r#"{"success": true, "suggestions": "Crop tighter", "note": "preview only"}"#,
        )
        .unwrap();
        assert_eq!(
            result.outcome(),
            GenerationOutcome::Suggestions {
                text: "Crop tighter",
                note: Some("preview only"),
            }
        );
    }

    #[test]
    fn test_outcome_failure_default_reason() {
        let result: GenerationResult = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(
            result.outcome(),
            GenerationOutcome::Failed {
                reason: DEFAULT_FAILURE_REASON
            }
        );
    }

    #[test]
    fn test_outcome_failure_reason_from_server() {
        let result: GenerationResult =
            serde_json::from_str(r#"{"success": false, "error": "quota exceeded"}"#).unwrap();
        assert_eq!(
            result.outcome(),
            GenerationOutcome::Failed {
                reason: "quota exceeded"
            }
        );
    }
}
