//! Frontmatter normalization rules.
//!
//! Every rule is independent and idempotent. Weight assignment needs the
//! whole directory and lives in [`weight`]; the batch runner drives it.

pub mod date;
pub mod title;
pub mod weight;

use chrono::{DateTime, FixedOffset};
use serde_yaml::{Mapping, Value};

use crate::config::FrontmatterConfig;
use crate::error::TidyResult;
use crate::model::Document;
use crate::utils::slug_from_filename;

pub use date::DateRule;
pub use title::TitleCleaner;
pub use weight::{max_weight, plan_weights, WeightCandidate};

/// A normalization rule that changed a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Reorder,
    Date,
    TitleCleanup,
    Slug,
    Type,
    Weight,
    TrailingWhitespace,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    field_order: Vec<String>,
    date: DateRule,
    title: TitleCleaner,
    default_type: Option<String>,
}

impl Normalizer {
    pub fn from_config(config: &FrontmatterConfig) -> TidyResult<Self> {
        Ok(Self {
            field_order: config.field_order.clone(),
            date: DateRule::new(&config.default_time, &config.default_offset)?,
            title: TitleCleaner::new(&config.title_prefix_patterns)?,
            default_type: config.default_type.clone(),
        })
    }

    /// The document's `date` as a timestamp, used to order weight assignment.
    pub fn parse_document_date(&self, doc: &Document) -> Option<DateTime<FixedOffset>> {
        doc.get_str("date").and_then(|raw| self.date.parse(raw))
    }

    /// Apply every per-document rule. Returns the rules that made a change.
    pub fn normalize(&self, doc: &mut Document, file_name: &str) -> Vec<Rule> {
        let mut applied = Vec::new();

        if self.rewrite_date(doc) {
            applied.push(Rule::Date);
        }
        if self.clean_title(doc) {
            applied.push(Rule::TitleCleanup);
        }
        if derive_slug(doc, file_name) {
            applied.push(Rule::Slug);
        }
        if self.apply_default_type(doc) {
            applied.push(Rule::Type);
        }
        if trim_trailing_whitespace(doc) {
            applied.push(Rule::TrailingWhitespace);
        }
        // Last, so fields added above land in their canonical slots.
        if self.reorder(doc) {
            applied.push(Rule::Reorder);
        }

        applied
    }

    /// Known fields first in canonical order, then the rest as they appeared.
    pub fn reorder(&self, doc: &mut Document) -> bool {
        let mut ordered = Mapping::with_capacity(doc.frontmatter.len());
        for field in &self.field_order {
            if let Some(value) = doc.frontmatter.get(field.as_str()) {
                ordered.insert(Value::String(field.clone()), value.clone());
            }
        }
        for (key, value) in &doc.frontmatter {
            if !ordered.contains_key(key) {
                ordered.insert(key.clone(), value.clone());
            }
        }

        let changed = !ordered.keys().eq(doc.frontmatter.keys());
        doc.frontmatter = ordered;
        changed
    }

    pub fn rewrite_date(&self, doc: &mut Document) -> bool {
        let Some(raw) = doc.get_str("date").map(str::to_string) else {
            return false;
        };
        match self.date.canonicalize(&raw) {
            Some(canonical) if canonical != raw => {
                doc.set("date", canonical);
                true
            }
            Some(_) => false,
            None => {
                log::warn!("Unrecognized date '{}', left unchanged", raw);
                false
            }
        }
    }

    pub fn clean_title(&self, doc: &mut Document) -> bool {
        let Some(title) = doc.title().map(str::to_string) else {
            return false;
        };
        let cleaned = self.title.clean(&title);
        if cleaned == title {
            return false;
        }
        doc.set("title", cleaned);
        true
    }

    pub fn apply_default_type(&self, doc: &mut Document) -> bool {
        let Some(default_type) = &self.default_type else {
            return false;
        };
        if is_blank(doc.get("type")) {
            doc.set("type", default_type.as_str());
            return true;
        }
        false
    }
}

/// Fill `slug` from the file name when it is missing or empty.
pub fn derive_slug(doc: &mut Document, file_name: &str) -> bool {
    if !is_blank(doc.get("slug")) {
        return false;
    }
    doc.set("slug", slug_from_filename(file_name));
    true
}

/// End the body with exactly one newline; an all-blank body becomes empty.
pub fn trim_trailing_whitespace(doc: &mut Document) -> bool {
    let trimmed = doc.body.trim_end();
    let normalized = if trimmed.trim_start().is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    };
    if normalized == doc.body {
        return false;
    }
    doc.body = normalized;
    true
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
