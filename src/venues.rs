//! Venue catalog: display names and chart colors for report rendering
//!
//! The catalog is plain TOML configuration handed to the reporting layer;
//! the dedup and distribution engines never see display metadata.
//!
//! ```toml
//! [venues.C060]
//! name = "Ireland Live Music"
//! color = "#ff6b6b"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Fallback tag color used by the HTML report
pub const DEFAULT_COLOR: &str = "#FF9500";

/// Display metadata for one venue code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VenueInfo {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Mapping from venue code to display metadata.
///
/// A non-empty catalog doubles as the venue filter: only listed codes are
/// analyzed. An empty catalog means "all venues seen in the log".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueCatalog {
    #[serde(default)]
    venues: BTreeMap<String, VenueInfo>,
}

impl VenueCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read venue catalog {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse venue catalog {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Whether this venue should be analyzed under the current catalog
    pub fn selects(&self, code: &str) -> bool {
        self.venues.is_empty() || self.venues.contains_key(code)
    }

    /// Display name for a code, falling back to the code itself
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.venues.get(code).map_or(code, |info| info.name.as_str())
    }

    /// Chart color for a code
    pub fn color(&self, code: &str) -> &str {
        self.venues
            .get(code)
            .map_or(DEFAULT_COLOR, |info| info.color.as_str())
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.venues.keys().map(String::as_str)
    }
}
