use regex::Regex;

use crate::error::{TidyError, TidyResult};

/// Strips recognized bracketed exam prefixes such as `【GESP】二级练习，` from titles.
#[derive(Debug, Clone)]
pub struct TitleCleaner {
    patterns: Vec<Regex>,
}

impl TitleCleaner {
    pub fn new(patterns: &[String]) -> TidyResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| TidyError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<TidyResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Remove prefixes until no pattern matches at the start.
    ///
    /// The original title is returned when stripping would leave nothing.
    pub fn clean(&self, title: &str) -> String {
        let mut current = title.to_string();
        let mut changed = false;
        loop {
            let mut stripped = false;
            for pattern in &self.patterns {
                if let Some(m) = pattern.find(&current) {
                    if m.start() == 0 && !m.is_empty() {
                        current = current[m.end()..].to_string();
                        stripped = true;
                    }
                }
            }
            if !stripped {
                break;
            }
            changed = true;
        }

        let cleaned = current.trim();
        if !changed || cleaned.is_empty() {
            title.to_string()
        } else {
            cleaned.to_string()
        }
    }
}
