use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::ops::Range;

/// Ordered frontmatter mapping. Key order is preserved through parse and render.
pub type Frontmatter = Mapping;

/// A Markdown document split into its YAML header and free-text body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    pub fn new(frontmatter: Frontmatter, body: impl Into<String>) -> Self {
        Self {
            frontmatter,
            body: body.into(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.frontmatter
            .insert(Value::String(key.to_string()), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.frontmatter.contains_key(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// Integer weight, accepting numeric strings the way hand-edited files carry them.
    pub fn weight(&self) -> Option<i64> {
        match self.get("weight")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Category strings; a single scalar is treated as a one-element list.
    pub fn categories(&self) -> Vec<String> {
        match self.get("categories") {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// An ATX heading located in a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Byte range of the heading line within the body, newline excluded.
    pub line: Range<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Document {
        let frontmatter: Mapping = serde_yaml::from_str(yaml).unwrap();
        Document::new(frontmatter, "")
    }

    #[test]
    fn test_weight_accepts_numbers_and_numeric_strings() {
        assert_eq!(doc("weight: 7").weight(), Some(7));
        assert_eq!(doc("weight: '12'").weight(), Some(12));
        assert_eq!(doc("weight: heavy").weight(), None);
        assert_eq!(doc("weight: 1.5").weight(), None);
        assert_eq!(doc("title: x").weight(), None);
    }

    #[test]
    fn test_categories_list_or_scalar() {
        assert_eq!(
            doc("categories:\n- GESP\n- 二级").categories(),
            vec!["GESP".to_string(), "二级".to_string()]
        );
        assert_eq!(doc("categories: 三级").categories(), vec!["三级".to_string()]);
        assert!(doc("title: x").categories().is_empty());
    }
}
