use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, feature::ArtifactLayout};

/// Engine configuration
/// Every field has a default, an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// root of the per-feature artifact tree
    pub artifact_root: PathBuf,
    /// universe artifact, `<artifact_root>/universe.vector` when unset
    pub universe_path: Option<PathBuf>,
    /// stopword list, the bundled English list when unset
    pub stopwords_path: Option<PathBuf>,
    /// feature catalogue, the builtin catalogue when unset
    pub catalogue_path: Option<PathBuf>,
    pub document_cache: DocumentCacheConfig,
    pub classification: ClassificationConfig,
    pub duplicates: DuplicateConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("artifacts"),
            universe_path: None,
            stopwords_path: None,
            catalogue_path: None,
            document_cache: DocumentCacheConfig::default(),
            classification: ClassificationConfig::default(),
            duplicates: DuplicateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentCacheConfig {
    /// 0 disables the memo
    pub capacity: u64,
    pub ttl_secs: u64,
}

impl Default for DocumentCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_secs: 60,
        }
    }
}

impl DocumentCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub top_per_category: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self { top_per_category: 5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    /// two documents further apart than this are never duplicates
    pub window_hours: u32,
    pub similarity_threshold: f64,
    /// most candidates asked from a supplier
    pub candidate_limit: usize,
    /// top TF-IDF terms used as the candidate query
    pub keyword_count: usize,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            window_hours: 6,
            similarity_threshold: 0.25,
            candidate_limit: 50,
            keyword_count: 10,
        }
    }
}

impl DuplicateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.similarity_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid {
                field: "duplicates.similarity_threshold",
                reason: format!("{threshold} is not a finite value in [0, 1]"),
            });
        }
        if self.window_hours == 0 {
            return Err(ConfigError::Invalid {
                field: "duplicates.window_hours",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.window_hours))
    }
}

impl EngineConfig {
    /// Parse a TOML config
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    /// Relative paths inside the file resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => config.relative_to(base),
            _ => config,
        })
    }

    /// Reject values that would silently disable classification or duplicate detection
    ///
    /// # Returns
    /// * `Err(ConfigError::Invalid)` - naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classification.top_per_category == 0 {
            return Err(ConfigError::Invalid {
                field: "classification.top_per_category",
                reason: "must be at least 1".to_string(),
            });
        }
        self.duplicates.validate()
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let paths = std::iter::once(&mut self.artifact_root)
            .chain(self.universe_path.as_mut())
            .chain(self.stopwords_path.as_mut())
            .chain(self.catalogue_path.as_mut());
        for path in paths {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(&self.artifact_root)
    }

    /// Effective universe artifact path
    pub fn universe_path(&self) -> PathBuf {
        self.universe_path
            .clone()
            .unwrap_or_else(|| self.layout().universe_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.universe_path(), PathBuf::from("artifacts/universe.vector"));
        assert_eq!(config.document_cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.duplicates.window(), chrono::Duration::hours(6));
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            artifact_root = "/srv/artifacts"
            universe_path = "/srv/universe.vector"

            [document_cache]
            capacity = 10

            [duplicates]
            similarity_threshold = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.universe_path(), PathBuf::from("/srv/universe.vector"));
        assert_eq!(config.document_cache, DocumentCacheConfig { capacity: 10, ttl_secs: 60 });
        assert_eq!(config.duplicates.similarity_threshold, 0.5);
        assert_eq!(config.duplicates.window_hours, 6);
        assert_eq!(config.classification.top_per_category, 5);
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "artifact_root = \"data\"\ncatalogue_path = \"/etc/catalogue.toml\"\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.artifact_root, dir.path().join("data"));
        assert_eq!(config.catalogue_path, Some(PathBuf::from("/etc/catalogue.toml")));
        assert_eq!(config.universe_path(), dir.path().join("data").join("universe.vector"));
    }

    #[test]
    fn bad_types_are_parse_errors() {
        let err = EngineConfig::from_toml_str("[classification]\ntop_per_category = \"five\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[rstest]
    #[case("[duplicates]\nsimilarity_threshold = nan", "duplicates.similarity_threshold")]
    #[case("[duplicates]\nsimilarity_threshold = inf", "duplicates.similarity_threshold")]
    #[case("[duplicates]\nsimilarity_threshold = 1.5", "duplicates.similarity_threshold")]
    #[case("[duplicates]\nsimilarity_threshold = -3.0", "duplicates.similarity_threshold")]
    #[case("[duplicates]\nwindow_hours = 0", "duplicates.window_hours")]
    #[case("[classification]\ntop_per_category = 0", "classification.top_per_category")]
    fn out_of_range_values_are_rejected(#[case] text: &str, #[case] expected: &str) {
        match EngineConfig::from_toml_str(text) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected Invalid for {expected}, got {other:?}"),
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    fn threshold_bounds_are_inclusive(#[case] threshold: f64) {
        let config = DuplicateConfig {
            similarity_threshold: threshold,
            ..DuplicateConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_validates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[duplicates]\nwindow_hours = 0\n").unwrap();
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "duplicates.window_hours", .. }));
    }
}
