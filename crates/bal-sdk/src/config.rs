use std::path::Path;

use bal_diff::ClassifierConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyzeError, AnalyzeResult};

/// Which files count as unit definitions, and how to classify them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Unit definitions live under this repository-relative prefix.
    pub unit_path_prefix: String,
    /// File extension of unit definitions, without the dot.
    pub extension: String,
    /// Paths containing any of these are never analyzed.
    pub excluded_markers: Vec<String>,
    /// Paths containing any of these belong to a variant unit population.
    pub variant_markers: Vec<String>,
    /// Analyze variant units too, flagging their changes.
    pub include_variants: bool,
    pub classifier: ClassifierConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            unit_path_prefix: "units/".into(),
            extension: "lua".into(),
            excluded_markers: vec!["other".into()],
            variant_markers: vec!["Scavengers".into()],
            include_variants: false,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(text: &str) -> AnalyzeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> AnalyzeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AnalyzeError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded analyzer config");
        Ok(config)
    }

    /// Returns `true` if the path lies in a variant unit population.
    pub fn is_variant_path(&self, path: &str) -> bool {
        self.variant_markers.iter().any(|m| path.contains(m.as_str()))
    }
}
