use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TidyError, TidyResult};

/// Top-level configuration for mdtidy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    pub frontmatter: FrontmatterConfig,
    pub weight: WeightConfig,
    pub classifier: ClassifierConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Frontmatter normalization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontmatterConfig {
    /// Canonical field order; unknown fields follow in their original order
    pub field_order: Vec<String>,
    /// Time of day used when a date carries none (`HH:MM:SS`)
    pub default_time: String,
    /// Offset used when a date carries none (`+HHMM`)
    pub default_offset: String,
    /// Value written to `type` when it is missing. `None` disables the rule.
    pub default_type: Option<String>,
    /// Regexes stripped from the start of titles, applied until none match
    pub title_prefix_patterns: Vec<String>,
    /// Leave files whose name starts with `_` (section indexes) alone
    pub skip_underscore_files: bool,
}

/// Which documents share a weight sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightScope {
    /// New weights continue from the maximum of the document's own directory
    #[default]
    Directory,
    /// New weights continue from the maximum of the whole formatted tree
    Tree,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub scope: WeightScope,
}

/// Exam file classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Keyword after the date prefix in exam file names (`2024-01-01-<infix>-...`)
    pub exam_infix: String,
    /// Title substring marking a real exam paper
    pub real_exam_marker: String,
    /// Title substring marking a practice set
    pub practice_marker: String,
    /// Level names in category strings, index 0 is level 1
    pub level_tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Walk the destination tree for every lookup
    Off,
    /// Walk once, then track copies in memory
    #[default]
    Memory,
    /// Like `Memory`, but loaded from and saved to a JSON side file
    Persistent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub mode: CacheMode,
    /// Side file name, relative to the destination root unless absolute
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

impl Default for FrontmatterConfig {
    fn default() -> Self {
        Self {
            field_order: [
                "layout",
                "title",
                "date",
                "author",
                "comments",
                "tags",
                "categories",
                "slug",
                "type",
                "weight",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            default_time: "20:00:00".to_string(),
            default_offset: "+0800".to_string(),
            default_type: Some("docs".to_string()),
            title_prefix_patterns: vec![
                r"^\s*【[^】]*】\s*(?:[一二三四五六七八]级[^，,：:\s]{0,8}[，,：:]\s*)?".to_string(),
            ],
            skip_underscore_files: true,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            exam_infix: "gesp".to_string(),
            real_exam_marker: "真题".to_string(),
            practice_marker: "练习".to_string(),
            level_tokens: ["一级", "二级", "三级", "四级", "五级", "六级", "七级", "八级"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::Memory,
            file: PathBuf::from(".mdtidy-cache.json"),
        }
    }
}

impl TidyConfig {
    /// File looked up in the working directory when no path is given.
    pub const DEFAULT_FILE_NAME: &'static str = ".mdtidy.yaml";

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load from `path`, or from `.mdtidy.yaml` in `cwd` if present, else defaults.
    pub fn load(path: Option<&Path>, cwd: &Path) -> TidyResult<Self> {
        let candidate = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = cwd.join(Self::DEFAULT_FILE_NAME);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content =
            std::fs::read_to_string(&candidate).map_err(|e| TidyError::io(&candidate, e))?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TidyResult<()> {
        if self.classifier.exam_infix.trim().is_empty() {
            return Err(TidyError::Config("classifier.exam_infix is empty".into()));
        }
        if self.classifier.level_tokens.is_empty() {
            return Err(TidyError::Config("classifier.level_tokens is empty".into()));
        }
        crate::normalize::Normalizer::from_config(&self.frontmatter)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config =
            TidyConfig::from_yaml("weight:\n  scope: tree\ncache:\n  mode: off\n").unwrap();
        assert_eq!(config.weight.scope, WeightScope::Tree);
        assert_eq!(config.cache.mode, CacheMode::Off);
        assert_eq!(config.frontmatter.default_time, "20:00:00");
        assert_eq!(config.classifier.level_tokens.len(), 8);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = TidyConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back = TidyConfig::from_yaml(&yaml).unwrap();
        assert_eq!(back.frontmatter.field_order, config.frontmatter.field_order);
        assert_eq!(back.classifier.exam_infix, "gesp");
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = TidyConfig::default();
        config.frontmatter.title_prefix_patterns = vec!["([".to_string()];
        assert!(matches!(config.validate(), Err(TidyError::Pattern { .. })));
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = TidyConfig::load(None, temp_dir.path()).unwrap();
        assert_eq!(config.cache.mode, CacheMode::Memory);
    }

    #[test]
    fn test_load_from_working_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(TidyConfig::DEFAULT_FILE_NAME),
            "logging:\n  level: debug\n",
        )
        .unwrap();
        let config = TidyConfig::load(None, temp_dir.path()).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
    }
}
