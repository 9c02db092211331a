use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::config::ClassifierConfig;
use crate::error::{TidyError, TidyResult};
use crate::model::Document;

/// Subdirectory kind inside a level directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    CodeReal,
    Practice,
    Syllabus,
    Knowledge,
    Others,
}

impl Kind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Kind::CodeReal => "codereal",
            Kind::Practice => "practice",
            Kind::Syllabus => "syllabus",
            Kind::Knowledge => "knowledge",
            Kind::Others => "others",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Target {
    pub level: u8,
    pub kind: Kind,
}

impl Target {
    /// Path relative to the destination root, e.g. `2/practice`.
    pub fn relative_dir(&self) -> String {
        format!("{}/{}", self.level, self.kind.dir_name())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_dir())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Target(Target),
    /// File name does not follow the exam naming pattern
    NotExamFile,
    /// No level token in the categories
    Unclassifiable,
}

pub struct Classifier {
    file_pattern: Regex,
    real_exam_marker: String,
    practice_marker: String,
    level_tokens: Vec<String>,
}

impl Classifier {
    pub fn from_config(config: &ClassifierConfig) -> TidyResult<Self> {
        let pattern = format!(
            r"^\d{{4}}-\d{{2}}-\d{{2}}-{}-.*\.md$",
            regex::escape(&config.exam_infix)
        );
        let file_pattern = Regex::new(&pattern).map_err(|source| TidyError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        Ok(Self {
            file_pattern,
            real_exam_marker: config.real_exam_marker.clone(),
            practice_marker: config.practice_marker.clone(),
            level_tokens: config.level_tokens.clone(),
        })
    }

    pub fn is_exam_file(&self, file_name: &str) -> bool {
        self.file_pattern.is_match(file_name)
    }

    /// Level 1..=8 from the first category naming one.
    pub fn level_of(&self, categories: &[String]) -> Option<u8> {
        categories.iter().find_map(|category| {
            self.level_tokens
                .iter()
                .position(|token| category.contains(token.as_str()))
                .map(|index| index as u8 + 1)
        })
    }

    pub fn kind_of(&self, title: &str, file_name: &str) -> Kind {
        let lower_name = file_name.to_lowercase();
        if !self.real_exam_marker.is_empty() && title.contains(&self.real_exam_marker) {
            Kind::CodeReal
        } else if !self.practice_marker.is_empty() && title.contains(&self.practice_marker) {
            Kind::Practice
        } else if lower_name.contains("syllabus") {
            Kind::Syllabus
        } else if lower_name.contains("knowledge") {
            Kind::Knowledge
        } else {
            Kind::Others
        }
    }

    /// Decide which `<level>/<kind>` directory a document belongs in.
    pub fn classify(&self, doc: &Document, file_name: &str) -> Classification {
        if !self.is_exam_file(file_name) {
            return Classification::NotExamFile;
        }
        let Some(level) = self.level_of(&doc.categories()) else {
            return Classification::Unclassifiable;
        };
        let kind = self.kind_of(doc.title().unwrap_or_default(), file_name);
        Classification::Target(Target { level, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn classifier() -> Classifier {
        Classifier::from_config(&ClassifierConfig::default()).unwrap()
    }

    fn classify(text: &str, file_name: &str) -> Classification {
        let doc = parse_document(text).into_document().unwrap();
        classifier().classify(&doc, file_name)
    }

    fn target(level: u8, kind: Kind) -> Classification {
        Classification::Target(Target { level, kind })
    }

    #[test]
    fn test_exam_file_pattern() {
        let c = classifier();
        assert!(c.is_exam_file("2024-11-03-gesp-1-practice.md"));
        assert!(!c.is_exam_file("2024-11-03-csp-1.md"));
        assert!(!c.is_exam_file("gesp-1.md"));
        assert!(!c.is_exam_file("2024-11-03-gesp-1.txt"));
    }

    #[test]
    fn test_kind_rules_in_priority_order() {
        let fm = "---\ncategories:\n- GESP\n- 二级\ntitle: {}\n---\n";
        let name = "2024-11-03-gesp-syllabus-knowledge.md";

        assert_eq!(
            classify(&fm.replace("{}", "2024年真题练习"), name),
            target(2, Kind::CodeReal)
        );
        assert_eq!(
            classify(&fm.replace("{}", "循环练习"), name),
            target(2, Kind::Practice)
        );
        assert_eq!(classify(&fm.replace("{}", "大纲"), name), target(2, Kind::Syllabus));
        assert_eq!(
            classify(&fm.replace("{}", "知识点"), "2024-11-03-gesp-Knowledge-1.md"),
            target(2, Kind::Knowledge)
        );
        assert_eq!(
            classify(&fm.replace("{}", "杂谈"), "2024-11-03-gesp-misc.md"),
            target(2, Kind::Others)
        );
    }

    #[test]
    fn test_level_from_any_category() {
        let text = "---\ncategories:\n- GESP\n- C++八级\ntitle: x\n---\n";
        assert_eq!(classify(text, "2024-01-01-gesp-x.md"), target(8, Kind::Others));

        let scalar = "---\ncategories: 五级\ntitle: x\n---\n";
        assert_eq!(classify(scalar, "2024-01-01-gesp-x.md"), target(5, Kind::Others));
    }

    #[test]
    fn test_missing_level_is_unclassifiable() {
        let text = "---\ncategories:\n- GESP\ntitle: 真题\n---\n";
        assert_eq!(
            classify(text, "2024-01-01-gesp-x.md"),
            Classification::Unclassifiable
        );
        assert_eq!(
            classify("---\ntitle: 真题\n---\n", "2024-01-01-gesp-x.md"),
            Classification::Unclassifiable
        );
    }

    #[test]
    fn test_non_exam_file_rejected_before_frontmatter() {
        let text = "---\ncategories:\n- 一级\n---\n";
        assert_eq!(classify(text, "notes.md"), Classification::NotExamFile);
    }

    #[test]
    fn test_target_relative_dir() {
        let t = Target {
            level: 3,
            kind: Kind::CodeReal,
        };
        assert_eq!(t.relative_dir(), "3/codereal");
        assert_eq!(t.to_string(), "3/codereal");
    }
}
