use crate::model::{Document, Frontmatter, Heading};
use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::Regex;
use serde_yaml::Value;
use std::sync::LazyLock;

static FRONTMATTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)??---[ \t]*(?:\r?\n|\z)")
        .expect("hardcoded frontmatter regex must compile")
});

/// Why a document could not be split into frontmatter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnparsedReason {
    MissingDelimiter,
    InvalidYaml(String),
    NotAMapping,
}

impl std::fmt::Display for UnparsedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnparsedReason::MissingDelimiter => write!(f, "no frontmatter delimiters"),
            UnparsedReason::InvalidYaml(msg) => write!(f, "invalid frontmatter YAML: {}", msg),
            UnparsedReason::NotAMapping => write!(f, "frontmatter is not a key/value mapping"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDocument {
    Parsed(Document),
    Unparsed(UnparsedReason),
}

impl ParsedDocument {
    pub fn into_document(self) -> Option<Document> {
        match self {
            ParsedDocument::Parsed(doc) => Some(doc),
            ParsedDocument::Unparsed(_) => None,
        }
    }
}

/// Split raw text into the YAML header and the body that follows the closing delimiter.
pub fn split_document(text: &str) -> Option<(&str, &str)> {
    let caps = FRONTMATTER_REGEX.captures(text)?;
    let whole = caps.get(0)?;
    let yaml = caps.get(1).map_or("", |m| m.as_str());
    Some((yaml, &text[whole.end()..]))
}

pub fn parse_document(text: &str) -> ParsedDocument {
    let Some((yaml, body)) = split_document(text) else {
        return ParsedDocument::Unparsed(UnparsedReason::MissingDelimiter);
    };

    let value = match serde_yaml::from_str::<Value>(yaml) {
        Ok(value) => value,
        Err(e) => return ParsedDocument::Unparsed(UnparsedReason::InvalidYaml(e.to_string())),
    };

    let frontmatter = match value {
        Value::Mapping(mapping) => mapping,
        // An empty header block is a document with no fields yet.
        Value::Null => Frontmatter::new(),
        _ => return ParsedDocument::Unparsed(UnparsedReason::NotAMapping),
    };

    ParsedDocument::Parsed(Document::new(frontmatter, body))
}

/// Line terminator style of a document, taken from its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if text[..i].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    /// Rewrite every line break in `text` to this style.
    pub fn apply(self, text: String) -> String {
        match self {
            LineEnding::Lf => text,
            LineEnding::CrLf => text.replace("\r\n", "\n").replace('\n', "\r\n"),
        }
    }
}

/// Render with LF line endings; see [`LineEnding::apply`] for CRLF files.
pub fn render_document(doc: &Document) -> Result<String, serde_yaml::Error> {
    if doc.frontmatter.is_empty() {
        return Ok(format!("---\n---\n{}", doc.body));
    }
    let yaml = serde_yaml::to_string(&doc.frontmatter)?;
    Ok(format!("---\n{}\n---\n{}", yaml.trim_end(), doc.body))
}

/// All ATX level-2 headings of a body, in document order.
///
/// Setext headings and anything inside code blocks are ignored, so
/// `## ` lines in fenced examples never count as headings.
pub fn level2_headings(body: &str) -> Vec<Heading> {
    let mut headings = Vec::new();

    for (event, range) in Parser::new_ext(body, Options::empty()).into_offset_iter() {
        let Event::Start(Tag::Heading { level, .. }) = event else {
            continue;
        };
        let level = level as u8;
        if level != 2 {
            continue;
        }

        let line = line_bounds(body, range.start);
        if let Some(text) = atx_heading_text(&body[line.clone()], level) {
            if !text.is_empty() {
                headings.push(Heading { level, text, line });
            }
        }
    }

    headings
}

pub fn first_level2_heading(body: &str) -> Option<Heading> {
    level2_headings(body).into_iter().next()
}

/// Rewrite the text of `heading` in place, keeping its indentation and marker.
pub fn replace_heading_text(body: &str, heading: &Heading, new_text: &str) -> String {
    let line = &body[heading.line.clone()];
    let indent_len = line.len() - line.trim_start().len();
    let marker = "#".repeat(heading.level as usize);

    let mut out = String::with_capacity(body.len() + new_text.len());
    out.push_str(&body[..heading.line.start]);
    out.push_str(&line[..indent_len]);
    out.push_str(&marker);
    out.push(' ');
    out.push_str(new_text);
    out.push_str(&body[heading.line.end..]);
    out
}

pub fn content_digest(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn line_bounds(text: &str, offset: usize) -> std::ops::Range<usize> {
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let mut end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    if text[start..end].ends_with('\r') {
        end -= 1;
    }
    start..end
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn atx_heading_text(line: &str, level: u8) -> Option<String> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes != level as usize {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(is_blank) {
        return None;
    }

    let rest = rest.trim();
    // Optional closing sequence: `## Title ##`
    let without_closing = rest.trim_end_matches('#');
    let text = if without_closing.is_empty() {
        ""
    } else if without_closing.len() != rest.len() && without_closing.ends_with(is_blank) {
        without_closing.trim_end()
    } else {
        rest
    };
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = "---\ntitle: My Note\nweight: 3\n---\n# Content";
        let doc = parse_document(content).into_document().unwrap();

        assert_eq!(doc.title(), Some("My Note"));
        assert_eq!(doc.weight(), Some(3));
        assert_eq!(doc.body, "# Content");
    }

    #[test]
    fn test_missing_delimiter_is_unparsed() {
        assert_eq!(
            parse_document("# Just a heading\n"),
            ParsedDocument::Unparsed(UnparsedReason::MissingDelimiter)
        );
        assert_eq!(
            parse_document("---\ntitle: never closed\n"),
            ParsedDocument::Unparsed(UnparsedReason::MissingDelimiter)
        );
    }

    #[test]
    fn test_invalid_yaml_is_unparsed() {
        let result = parse_document("---\ntitle: [unclosed\n---\nbody");
        assert!(matches!(
            result,
            ParsedDocument::Unparsed(UnparsedReason::InvalidYaml(_))
        ));
    }

    #[test]
    fn test_scalar_header_is_not_a_mapping() {
        assert_eq!(
            parse_document("---\njust text\n---\nbody"),
            ParsedDocument::Unparsed(UnparsedReason::NotAMapping)
        );
    }

    #[test]
    fn test_empty_header_and_eof_delimiter() {
        let doc = parse_document("---\n---\nbody").into_document().unwrap();
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, "body");

        let doc = parse_document("---\ntitle: A\n---").into_document().unwrap();
        assert_eq!(doc.title(), Some("A"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_crlf_document() {
        let doc = parse_document("---\r\ntitle: A\r\n---\r\nbody\r\n")
            .into_document()
            .unwrap();
        assert_eq!(doc.title(), Some("A"));
        assert_eq!(doc.body, "body\r\n");
    }

    #[test]
    fn test_render_round_trip_keeps_order_and_body() {
        let content = "---\ntitle: B\ndate: 2024-11-03T10:00:00+0800\ncategories:\n- GESP\n- 一级\n---\n\n## Body\n";
        let doc = parse_document(content).into_document().unwrap();
        let rendered = render_document(&doc).unwrap();
        let reparsed = parse_document(&rendered).into_document().unwrap();

        assert_eq!(reparsed, doc);
        assert!(rendered.ends_with("---\n\n## Body\n"));
        let keys: Vec<_> = doc
            .frontmatter
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["title", "date", "categories"]);
    }

    #[test]
    fn test_render_empty_frontmatter() {
        let doc = Document::new(Frontmatter::new(), "text");
        assert_eq!(render_document(&doc).unwrap(), "---\n---\ntext");
    }

    #[test]
    fn test_first_level2_heading() {
        let body = "# Top\n\nintro\n\n## Intro Basics\n\n## Second\n";
        let heading = first_level2_heading(body).unwrap();
        assert_eq!(heading.text, "Intro Basics");
        assert_eq!(&body[heading.line.clone()], "## Intro Basics");
    }

    #[test]
    fn test_headings_in_code_blocks_are_ignored() {
        let body = "```\n## not a heading\n```\n\n### Deeper\n\n## Real ##\n";
        let headings = level2_headings(body);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Real");
    }

    #[test]
    fn test_setext_heading_is_ignored() {
        let body = "Setext\n------\n\n## Atx\n";
        let heading = first_level2_heading(body).unwrap();
        assert_eq!(heading.text, "Atx");
    }

    #[test]
    fn test_replace_heading_text() {
        let body = "intro\n\n## Old\r\nrest\n";
        let heading = first_level2_heading(body).unwrap();
        let updated = replace_heading_text(body, &heading, "New Title");
        assert_eq!(updated, "intro\n\n## New Title\r\nrest\n");
    }

    #[test]
    fn test_content_digest() {
        let a = content_digest(b"Content A");
        assert_eq!(a, content_digest(b"Content A"));
        assert_ne!(a, content_digest(b"Content B"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_crlf_document_renders_back_unchanged() {
        let content = "---\r\ntitle: A\r\n---\r\n## A\r\nbody\r\n";
        let ending = LineEnding::detect(content);
        assert_eq!(ending, LineEnding::CrLf);

        let doc = parse_document(content).into_document().unwrap();
        let rendered = ending.apply(render_document(&doc).unwrap());
        assert_eq!(rendered, content);

        assert_eq!(LineEnding::detect("---\ntitle: A\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("no newline"), LineEnding::Lf);
    }
}
