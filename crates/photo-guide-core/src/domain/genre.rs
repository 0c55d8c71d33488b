//! Photo genres understood by the composition service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValueError;

/// Genre the composition rules are tuned for.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    /// People as the main subject.
    #[default]
    Portrait,
    /// Scenery, horizons, wide shots.
    Landscape,
    /// Objects shot for catalogues and shops.
    Product,
}

impl Genre {
    /// All genres, in menu order.
    pub const ALL: [Self; 3] = [Self::Portrait, Self::Landscape, Self::Product];

    /// Wire value sent in the `genre` form field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
            Self::Product => "product",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
            Self::Product => "Product",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| ValueError::UnknownGenre(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_portrait() {
        assert_eq!(Genre::default(), Genre::Portrait);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Landscape".parse::<Genre>().unwrap(), Genre::Landscape);
        assert_eq!(" product ".parse::<Genre>().unwrap(), Genre::Product);
    }

    #[test]
    fn test_parse_unknown_lists_choices() {
        let err = "macro".parse::<Genre>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("macro"));
        assert!(msg.contains("portrait, landscape, product"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Genre::Landscape).unwrap();
        assert_eq!(json, "\"landscape\"");
        let back: Genre = serde_json::from_str("\"product\"").unwrap();
        assert_eq!(back, Genre::Product);
    }
}
