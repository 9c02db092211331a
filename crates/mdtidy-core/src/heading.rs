//! Keeping the frontmatter title and the first `##` heading in agreement.

use serde_yaml::Value;

use crate::model::Document;
use crate::parser::{first_level2_heading, replace_heading_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Unchanged,
    Updated {
        old_title: String,
        new_title: String,
        heading_rewritten: bool,
    },
    MissingTitle,
    MissingHeading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    AlreadySet,
    Filled(String),
    MissingHeading,
}

/// Make title and first level-2 heading identical.
///
/// If the heading already contains the title, the heading wins. Otherwise
/// both become `"<heading> <title>"`.
pub fn reconcile_title(doc: &mut Document) -> ReconcileOutcome {
    let Some(title) = title_text(doc) else {
        return ReconcileOutcome::MissingTitle;
    };
    let Some(heading) = first_level2_heading(&doc.body) else {
        return ReconcileOutcome::MissingHeading;
    };

    let (new_title, heading_rewritten) = if heading.text.contains(&title) {
        (heading.text.clone(), false)
    } else {
        (format!("{} {}", heading.text, title), true)
    };

    if heading_rewritten {
        doc.body = replace_heading_text(&doc.body, &heading, &new_title);
    }
    if new_title == title {
        return ReconcileOutcome::Unchanged;
    }
    doc.set("title", new_title.clone());

    ReconcileOutcome::Updated {
        old_title: title,
        new_title,
        heading_rewritten,
    }
}

/// Set a missing, null or blank title from the first level-2 heading.
pub fn fill_empty_title(doc: &mut Document) -> FillOutcome {
    let is_empty = match doc.get("title") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if !is_empty {
        return FillOutcome::AlreadySet;
    }

    let Some(heading) = first_level2_heading(&doc.body) else {
        return FillOutcome::MissingHeading;
    };
    doc.set("title", heading.text.clone());
    FillOutcome::Filled(heading.text)
}

/// Title as text. Scalars such as `title: 2024` count; null does not.
fn title_text(doc: &Document) -> Option<String> {
    match doc.get("title")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
