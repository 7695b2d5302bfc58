//! Optional JSON config for non-standard data layouts
//!
//! ```json
//! {
//!   "title": "Dashboard de Llamadas de Cobranza",
//!   "data_dir": "exports/2024-06",
//!   "call_results": "exports/2024-06/llamadas.csv",
//!   "logo": "branding/logo.png"
//! }
//! ```
//!
//! Every field is optional. `data_dir` picks the directory for the standard
//! file names; the per-file fields then override individual tables.

use crate::data::DataPaths;
use crate::error::LoadError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TITLE: &str = "📞 Dashboard de Llamadas de Cartera";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub title: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub advisor_scores: Option<PathBuf>,
    pub category_detail: Option<PathBuf>,
    pub sentiment: Option<PathBuf>,
    pub advisor_polarity: Option<PathBuf>,
    pub call_results: Option<PathBuf>,
    pub logo: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(path, &text)
    }

    fn from_json(path: &Path, text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the final paths. `data_dir` replaces `fallback_dir` wholesale,
    /// then each explicit file wins over the directory default.
    pub fn resolve_paths(&self, fallback_dir: &Path, fallback_logo: &Path) -> DataPaths {
        let dir = self.data_dir.as_deref().unwrap_or(fallback_dir);
        let mut paths = DataPaths::in_dir(dir).with_logo(fallback_logo);

        let overrides = [
            (&self.advisor_scores, &mut paths.advisor_scores),
            (&self.category_detail, &mut paths.category_detail),
            (&self.sentiment, &mut paths.sentiment),
            (&self.advisor_polarity, &mut paths.advisor_polarity),
            (&self.call_results, &mut paths.call_results),
            (&self.logo, &mut paths.logo),
        ];
        for (value, slot) in overrides {
            if let Some(p) = value {
                *slot = p.clone();
            }
        }

        paths
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ADVISOR_SCORES_FILE, CALL_RESULTS_FILE};

    #[test]
    fn test_empty_config_keeps_fallbacks() {
        let config = DashboardConfig::from_json(Path::new("c.json"), "{}").unwrap();
        let paths = config.resolve_paths(Path::new("data"), Path::new("images/logo.png"));

        assert_eq!(paths, DataPaths::in_dir("data").with_logo("images/logo.png"));
        assert_eq!(config.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_data_dir_and_file_overrides() {
        let config = DashboardConfig::from_json(
            Path::new("c.json"),
            r#"{"data_dir": "exports", "call_results": "other/calls.csv", "title": "QA"}"#,
        )
        .unwrap();
        let paths = config.resolve_paths(Path::new("data"), Path::new("logo.png"));

        assert_eq!(paths.advisor_scores, PathBuf::from("exports").join(ADVISOR_SCORES_FILE));
        assert_eq!(paths.call_results, PathBuf::from("other/calls.csv"));
        assert_ne!(paths.call_results, PathBuf::from("exports").join(CALL_RESULTS_FILE));
        assert_eq!(paths.logo, PathBuf::from("logo.png"));
        assert_eq!(config.title(), "QA");
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = DashboardConfig::from_json(Path::new("c.json"), r#"{"colour": "red"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = DashboardConfig::from_file(Path::new("/no/such/callboard.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
