use crate::classify::Classifier;
use crate::config::TidyConfig;
use crate::error::TidyResult;
use crate::normalize::Normalizer;
use crate::vfs::FileSystem;
use std::sync::Arc;

/// The Engine is the high-level facade of the core.
///
/// It owns the compiled rules (normalizer, classifier) built once from a
/// [`TidyConfig`], and the filesystem every batch run goes through. The run
/// methods live next to their logic: `format_directory` in `formatter`,
/// `fix_empty_titles` and `sync_titles` in `titles`, `organize` in
/// `organizer`.
pub struct Engine {
    pub config: TidyConfig,
    pub fs: Arc<dyn FileSystem>,
    pub(crate) normalizer: Normalizer,
    pub(crate) classifier: Classifier,
}

impl Engine {
    /// Compile the configured rules. Invalid patterns or offsets fail here,
    /// before any file is touched.
    pub fn new(config: TidyConfig, fs: Arc<dyn FileSystem>) -> TidyResult<Self> {
        config.validate()?;
        let normalizer = Normalizer::from_config(&config.frontmatter)?;
        let classifier = Classifier::from_config(&config.classifier)?;
        Ok(Self {
            config,
            fs,
            normalizer,
            classifier,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}
