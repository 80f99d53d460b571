//! Input trees consumed by the serializers.
//!
//! These are built once by a front end (see `parse.rs`) or by the caller and
//! then only read. None of them carries source positions; the serializers do
//! not need any.

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// HTML
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeIR {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HtmlNode {
    Element(ElementNode),
    Text(TextNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<AttributeIR>,
    pub children: Vec<HtmlNode>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(AttributeIR {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(HtmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, value: impl Into<String>) -> Self {
        self.children.push(HtmlNode::Text(TextNode {
            value: value.into(),
        }));
        self
    }

    /// The text of a leaf element: `Some` iff the only child is a text node.
    pub fn inline_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [HtmlNode::Text(text)] => Some(&text.value),
            _ => None,
        }
    }

    /// Element children in source order. Text siblings are skipped.
    pub fn element_children(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|child| match child {
            HtmlNode::Element(el) => Some(el),
            HtmlNode::Text(_) => None,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }

    /// Kind name used in encoding errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Number::Float(f) if f.is_nan() => "NaN",
            Number::Float(f) if f.is_infinite() => "Infinity",
            _ => "number",
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            // -0 prints as 0, matching base-10 formatting on the JS side.
            Number::Float(x) if *x == 0.0 => f.write_str("0"),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// A decoded JSON document, with JavaScript's `undefined` as its own variant.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Undefined,
    Bool(bool),
    Number(Number),
    String(String),
    Object(Vec<(String, JsonValue)>),
    Array(Vec<JsonValue>),
}

impl JsonValue {
    pub fn kind(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Undefined => "undefined",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(n) => n.kind(),
            JsonValue::String(_) => "string",
            JsonValue::Object(_) => "object",
            JsonValue::Array(_) => "array",
        }
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, JsonValue)>) -> Self {
        JsonValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => JsonValue::Number(match n.as_i64() {
                Some(i) => Number::Int(i),
                None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Number(Number::Int(value))
    }
}

impl From<f64> for JsonValue {
    fn from(value: f64) -> Self {
        JsonValue::Number(Number::Float(value))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CSS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlainRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyframeRule {
    /// `from`, `50%`, `to`, ...
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyframesBlock {
    pub name: String,
    pub keyframes: Vec<KeyframeRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleRule {
    Plain(PlainRule),
    Keyframes(KeyframesBlock),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_text_only_for_single_text_child() {
        assert_eq!(ElementNode::new("p").with_text("hi").inline_text(), Some("hi"));
        assert_eq!(ElementNode::new("p").with_text("").inline_text(), Some(""));
        assert_eq!(ElementNode::new("p").inline_text(), None);
        assert_eq!(
            ElementNode::new("p")
                .with_text("a")
                .with_text("b")
                .inline_text(),
            None
        );
        assert_eq!(
            ElementNode::new("p")
                .with_child(ElementNode::new("b"))
                .inline_text(),
            None
        );
    }

    #[test]
    fn test_element_children_skip_text() {
        let el = ElementNode::new("ul")
            .with_text("\n  ")
            .with_child(ElementNode::new("li"))
            .with_text("stray")
            .with_child(ElementNode::new("li").with_attr("class", "last"));
        let tags: Vec<_> = el.element_children().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["li", "li"]);
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Int(-42).to_string(), "-42");
        assert_eq!(Number::Float(1.5).to_string(), "1.5");
        assert_eq!(Number::Float(3.0).to_string(), "3");
        assert_eq!(Number::Float(-0.0).to_string(), "0");
        assert_eq!(Number::Float(1e21).to_string(), "1000000000000000000000");
    }

    #[test]
    fn test_from_serde_json_keeps_order() {
        let value: serde_json::Value = serde_json::from_str(r#"{"z": 1, "a": [true, null], "m": 2.5}"#).unwrap();
        let value = JsonValue::from(value);
        match value {
            JsonValue::Object(entries) => {
                let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["z", "a", "m"]);
                assert_eq!(entries[2].1, JsonValue::Number(Number::Float(2.5)));
                assert_eq!(
                    entries[1].1,
                    JsonValue::Array(vec![JsonValue::Bool(true), JsonValue::Null])
                );
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(JsonValue::Undefined.kind(), "undefined");
        assert_eq!(JsonValue::from(f64::NAN).kind(), "NaN");
        assert_eq!(JsonValue::from(f64::NEG_INFINITY).kind(), "Infinity");
        assert_eq!(JsonValue::from(7i64).kind(), "number");
    }
}
