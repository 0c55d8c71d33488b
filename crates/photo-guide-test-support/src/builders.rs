//! Fixture builders for testing.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photo_guide_core::domain::{
    CompositionAnalysis, GenerationResult, Genre, ImageDimensions, RuleScore, Upload,
};

/// Builder for composition analyses as the service would return them.
#[derive(Debug, Clone)]
pub struct AnalysisBuilder {
    analysis: CompositionAnalysis,
}

impl Default for AnalysisBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisBuilder {
    /// Starts from a plausible portrait analysis with two rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            analysis: CompositionAnalysis {
                total_score: 72.5,
                genre: Genre::Portrait,
                rules: vec![
                    rule(
                        "Rule of thirds",
                        81.0,
                        "Subject sits near a power point",
                        "Keep the eyes on the upper third line",
                    ),
                    rule("Exposure", 64.0, "Slightly dark", "Open up by a third of a stop"),
                ],
                coach_guide: "Place the eyes on the upper third.\nWatch the background edges."
                    .into(),
                expert_prompt: "Brighten the face slightly and keep natural skin tones".into(),
                metadata: serde_json::Map::new(),
            },
        }
    }

    /// Sets the genre.
    #[must_use]
    pub const fn genre(mut self, genre: Genre) -> Self {
        self.analysis.genre = genre;
        self
    }

    /// Sets the total score.
    #[must_use]
    pub const fn total_score(mut self, score: f32) -> Self {
        self.analysis.total_score = score;
        self
    }

    /// Removes all rules.
    #[must_use]
    pub fn no_rules(mut self) -> Self {
        self.analysis.rules.clear();
        self
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, name: &str, score: f32, message: &str, suggestion: &str) -> Self {
        self.analysis.rules.push(rule(name, score, message, suggestion));
        self
    }

    /// Sets the coach guide.
    #[must_use]
    pub fn coach_guide(mut self, guide: &str) -> Self {
        self.analysis.coach_guide = guide.into();
        self
    }

    /// Sets the expert prompt.
    #[must_use]
    pub fn expert_prompt(mut self, prompt: &str) -> Self {
        self.analysis.expert_prompt = prompt.into();
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.analysis.metadata.insert(key.into(), value);
        self
    }

    /// Finishes the analysis.
    #[must_use]
    pub fn build(self) -> CompositionAnalysis {
        self.analysis
    }

    /// Finishes the analysis as the JSON body the service sends.
    #[must_use]
    pub fn to_json(self) -> serde_json::Value {
        serde_json::to_value(self.analysis).unwrap_or_default()
    }
}

fn rule(name: &str, score: f32, message: &str, suggestion: &str) -> RuleScore {
    RuleScore {
        name: name.into(),
        score,
        message: message.into(),
        suggestion: suggestion.into(),
    }
}

/// Builder for generation responses.
#[derive(Debug, Clone)]
pub struct GenerationBuilder {
    result: GenerationResult,
}

impl GenerationBuilder {
    /// A successful result pointing at a regenerated image.
    #[must_use]
    pub fn image(url: &str) -> Self {
        Self {
            result: GenerationResult {
                success: true,
                image_url: Some(url.into()),
                ..GenerationResult::default()
            },
        }
    }

    /// A successful result carrying only textual suggestions.
    #[must_use]
    pub fn suggestions(text: &str) -> Self {
        Self {
            result: GenerationResult {
                success: true,
                suggestions: Some(text.into()),
                ..GenerationResult::default()
            },
        }
    }

    /// A reported failure.
    #[must_use]
    pub fn failed(error: Option<&str>) -> Self {
        Self {
            result: GenerationResult {
                success: false,
                error: error.map(Into::into),
                ..GenerationResult::default()
            },
        }
    }

    /// Sets the footnote.
    #[must_use]
    pub fn note(mut self, note: &str) -> Self {
        self.result.note = Some(note.into());
        self
    }

    /// Finishes the result.
    #[must_use]
    pub fn build(self) -> GenerationResult {
        self.result
    }

    /// Finishes the result as the JSON body the service sends.
    #[must_use]
    pub fn to_json(self) -> serde_json::Value {
        serde_json::to_value(self.result).unwrap_or_default()
    }
}

/// Builder for real, decodable image payloads.
pub struct SyntheticUpload;

impl SyntheticUpload {
    /// Encodes a horizontal gradient in `format`.
    ///
    /// Returns an empty buffer if encoding fails, which tests will notice.
    #[must_use]
    pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let v = ((x * 255) / width.max(1)) as u8;
            #[allow(clippy::cast_possible_truncation)]
            let w = ((y * 255) / height.max(1)) as u8;
            Rgb([v, w, 128])
        });
        let mut bytes = Vec::new();
        if DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .is_err()
        {
            bytes.clear();
        }
        bytes
    }

    /// PNG upload with dimensions filled in.
    #[must_use]
    pub fn png(name: &str, width: u32, height: u32) -> Upload {
        Upload::new(name, Self::encode(width, height, ImageFormat::Png))
            .with_dimensions(ImageDimensions::new(width, height))
    }

    /// JPEG upload with dimensions filled in.
    #[must_use]
    pub fn jpeg(name: &str, width: u32, height: u32) -> Upload {
        Upload::new(name, Self::encode(width, height, ImageFormat::Jpeg))
            .with_dimensions(ImageDimensions::new(width, height))
    }
}
