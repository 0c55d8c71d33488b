//! Configuration file support for photo-guide.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/photo-guide/config.toml` (lowest priority)
//! - Project-local: `.photo-guide.toml` (searched up directory tree)
//! - CLI flags and `PHOTO_GUIDE_SERVER` (highest priority, applied separately)

use std::path::{Path, PathBuf};

use photo_guide_core::{Genre, Style};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend connection settings.
    pub server: ServerConfig,
    /// Analysis step settings.
    pub analysis: AnalysisConfig,
    /// Generation step settings.
    pub generation: GenerationConfig,
    /// Upload limits.
    pub upload: UploadConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// Backend connection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server root URL.
    pub url: Option<String>,
    /// Prefix the API is mounted under.
    pub api_prefix: Option<String>,
    /// Timeout for analysis and downloads, in seconds.
    pub timeout_secs: Option<u64>,
    /// Timeout for image generation, in seconds.
    pub generation_timeout_secs: Option<u64>,
}

/// Analysis configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Default genre.
    pub genre: Option<String>,
    /// Expand the coach guide by default.
    pub show_guide: Option<bool>,
    /// Exit with status 1 when the total score is below this (0-100).
    pub fail_under: Option<f32>,
}

/// Generation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Default style preset.
    pub style: Option<String>,
    /// Default modification strength (0.0-1.0).
    pub strength: Option<f32>,
}

/// Upload configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum upload size in MiB.
    pub max_size_mb: Option<u64>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text" or "json".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress spinner.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/photo-guide/config.toml`
    /// 2. Project-local: `.photo-guide.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.server.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("server.url must start with http:// or https://, got '{url}'"));
            }
        }
        if self.server.timeout_secs == Some(0) {
            return Err("server.timeout_secs must be positive".to_string());
        }
        if self.server.generation_timeout_secs == Some(0) {
            return Err("server.generation_timeout_secs must be positive".to_string());
        }

        if let Some(ref g) = self.analysis.genre {
            if g.parse::<Genre>().is_err() {
                return Err(format!(
                    "analysis.genre must be 'portrait', 'landscape' or 'product', got '{g}'"
                ));
            }
        }
        if let Some(s) = self.analysis.fail_under {
            if !(0.0..=100.0).contains(&s) {
                return Err(format!("analysis.fail_under must be 0-100, got {s}"));
            }
        }

        if let Some(ref s) = self.generation.style {
            if s.parse::<Style>().is_err() {
                return Err(format!(
                    "generation.style must be 'natural', 'vivid' or 'dramatic', got '{s}'"
                ));
            }
        }
        if let Some(t) = self.generation.strength {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("generation.strength must be 0.0-1.0, got {t}"));
            }
        }

        if self.upload.max_size_mb == Some(0) {
            return Err("upload.max_size_mb must be positive".to_string());
        }

        if let Some(ref f) = self.output.format {
            if f != "text" && f != "json" {
                return Err(format!("output.format must be 'text' or 'json', got '{f}'"));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Server
        self.server.url = other.server.url.or_else(|| self.server.url.take());
        self.server.api_prefix = other
            .server
            .api_prefix
            .or_else(|| self.server.api_prefix.take());
        self.server.timeout_secs = other.server.timeout_secs.or(self.server.timeout_secs);
        self.server.generation_timeout_secs = other
            .server
            .generation_timeout_secs
            .or(self.server.generation_timeout_secs);

        // Analysis
        self.analysis.genre = other.analysis.genre.or_else(|| self.analysis.genre.take());
        self.analysis.show_guide = other.analysis.show_guide.or(self.analysis.show_guide);
        self.analysis.fail_under = other.analysis.fail_under.or(self.analysis.fail_under);

        // Generation
        self.generation.style = other
            .generation
            .style
            .or_else(|| self.generation.style.take());
        self.generation.strength = other.generation.strength.or(self.generation.strength);

        // Upload
        self.upload.max_size_mb = other.upload.max_size_mb.or(self.upload.max_size_mb);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }

    /// Configured genre, ignoring invalid values.
    pub fn genre(&self) -> Option<Genre> {
        self.analysis.genre.as_deref().and_then(|g| g.parse().ok())
    }

    /// Configured style, ignoring invalid values.
    pub fn style(&self) -> Option<Style> {
        self.generation.style.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("photo-guide").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.photo-guide.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".photo-guide.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.server.url.is_none());
        assert!(config.analysis.genre.is_none());
        assert!(config.generation.strength.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[server]
url = 'http://photo.example:8000'
api_prefix = '/api/v2'
timeout_secs = 10
generation_timeout_secs = 90

[analysis]
genre = 'landscape'
show_guide = true
fail_under = 60.0

[generation]
style = 'vivid'
strength = 0.4

[upload]
max_size_mb = 5

[output]
format = 'json'
pretty = true
progress = false
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.server.url.as_deref(), Some("http://photo.example:8000"));
        assert_eq!(config.server.api_prefix.as_deref(), Some("/api/v2"));
        assert_eq!(config.server.generation_timeout_secs, Some(90));
        assert_eq!(config.genre(), Some(Genre::Landscape));
        assert_eq!(config.analysis.fail_under, Some(60.0));
        assert_eq!(config.style(), Some(Style::Vivid));
        assert_eq!(config.generation.strength, Some(0.4));
        assert_eq!(config.upload.max_size_mb, Some(5));
        assert_eq!(config.output.format.as_deref(), Some("json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_find_config_in_parents() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".photo-guide.toml"), "").unwrap();

        let found = find_config_in_parents(&nested).unwrap();
        assert_eq!(found, root.path().join(".photo-guide.toml"));
    }

    // === Merge Priority ===

    #[test]
    fn test_merge_overrides_and_preserves() {
        let mut base: AppConfig = toml::from_str(
            r"
[server]
url = 'http://base:8000'
timeout_secs = 15

[generation]
style = 'natural'
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[server]
url = 'http://project:9000'

[analysis]
genre = 'product'
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.server.url.as_deref(), Some("http://project:9000"));
        assert_eq!(base.server.timeout_secs, Some(15));
        assert_eq!(base.generation.style.as_deref(), Some("natural"));
        assert_eq!(base.genre(), Some(Genre::Product));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[output]
format = 'json'
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.output.format.as_deref(), Some("json"));
    }

    // === Invalid TOML ===

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[generation]
strength = "strong"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_load_file_bad_syntax_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nurl = 1").unwrap();
        assert!(load_file(&path).is_none());
    }

    // === Validation ===

    #[test]
    fn test_validate_strength_out_of_range() {
        let mut config = AppConfig::default();
        config.generation.strength = Some(1.5);
        assert!(config.validate().unwrap_err().contains("generation.strength"));
    }

    #[test]
    fn test_validate_fail_under_out_of_range() {
        let mut config = AppConfig::default();
        config.analysis.fail_under = Some(101.0);
        assert!(config.validate().unwrap_err().contains("analysis.fail_under"));
    }

    #[test]
    fn test_validate_unknown_genre_and_style() {
        let mut config = AppConfig::default();
        config.analysis.genre = Some("macro".into());
        assert!(config.validate().unwrap_err().contains("analysis.genre"));
        assert!(config.genre().is_none());

        let mut config = AppConfig::default();
        config.generation.style = Some("sepia".into());
        assert!(config.validate().unwrap_err().contains("generation.style"));
    }

    #[test]
    fn test_validate_server_url_scheme() {
        let mut config = AppConfig::default();
        config.server.url = Some("localhost:8000".into());
        assert!(config.validate().unwrap_err().contains("server.url"));
    }

    #[test]
    fn test_validate_zero_timeouts_and_size() {
        let mut config = AppConfig::default();
        config.server.timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.upload.max_size_mb = Some(0);
        assert!(config.validate().unwrap_err().contains("upload.max_size_mb"));
    }

    #[test]
    fn test_validate_output_format_invalid() {
        let mut config = AppConfig::default();
        config.output.format = Some("jsonl".to_string());
        assert!(config.validate().unwrap_err().contains("output.format"));
    }

    #[test]
    fn test_validate_empty_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
