//! Notation dialects.
//!
//! The remote compiler has accepted several small variants of the same
//! object/array/string grammar over time. Rather than one serializer per
//! variant, every serializer takes a [`Dialect`] describing the punctuation
//! and literal spellings to emit.
//!
//! Three presets are built in:
//!
//! | preset | tag field | quote | separator | null   | undefined | children      |
//! |--------|-----------|-------|-----------|--------|-----------|---------------|
//! | `json` | `"t"`     | `"`   | `:`       | `null` | `null`    | array         |
//! | `opl`  | `'0'`     | `'`   | `=`       | `NULL` | `NULL`    | keyed by index|
//! | `scl`  | positional| `"`   | `=`       | `NULL` | omitted   | keyed by tag  |
//!
//! A dialect can also be loaded from a JSON config that names a preset and
//! overrides individual fields:
//!
//! ```json
//! { "preset": "opl", "escaping": "strict", "indent": { "spaces": 3 } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NotationError, Result};

/// Default recursion limit for all tree serializers.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Largest `max_depth` a config may ask for.
pub const MAX_DEPTH_LIMIT: usize = DEFAULT_MAX_DEPTH * 16;

/// How the element tag name is introduced in an HTML object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagField {
    /// `"t": "div"`
    Key(String),
    /// The tag is the first, unkeyed entry: `{"div", ...}`
    Positional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// Key/value separator inside objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Separator {
    /// `"key": value`
    Colon,
    /// `"key" = value`
    Equals,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Colon => ": ",
            Separator::Equals => " = ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BooleanStyle {
    /// `1` / `0`
    Numeric,
    /// `true` / `false`
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NullStyle {
    /// `NULL`
    Upper,
    /// `null`
    Lower,
}

impl NullStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NullStyle::Upper => "NULL",
            NullStyle::Lower => "null",
        }
    }
}

/// What happens to `undefined` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UndefinedStyle {
    /// Rendered with the dialect's null literal.
    AsNull,
    /// Object entries holding `undefined` are left out. Where there is no
    /// entry to drop (array items, top level) the null literal is used.
    Omit,
}

/// Shape of the `children` collection of an HTML object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChildrenLayout {
    /// `[ {...}, {...} ]`
    Array,
    /// `{ "div": {...}, "p": {...} }`
    KeyedByTag,
    /// `{ "0": {...}, "1": {...} }`
    KeyedByIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Indent {
    Tab,
    Spaces(u8),
}

impl Indent {
    pub fn unit(self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(n as usize),
        }
    }

    pub fn at(self, depth: usize) -> String {
        self.unit().repeat(depth)
    }
}

/// Separator placed between sequence items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SequenceSeparator {
    Newline,
    CommaNewline,
}

impl SequenceSeparator {
    pub fn as_str(self) -> &'static str {
        match self {
            SequenceSeparator::Newline => "\n",
            SequenceSeparator::CommaNewline => ",\n",
        }
    }
}

/// How string contents are written between quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscapeMode {
    /// Contents are inserted verbatim, matching what the remote compiler has
    /// always been fed. Embedded quotes produce unbalanced output.
    Faithful,
    /// Backslash, the active quote and control characters are escaped.
    Strict,
}

/// A complete notation dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dialect {
    pub name: String,
    pub tag_field: TagField,
    pub quote: QuoteStyle,
    pub separator: Separator,
    pub boolean_style: BooleanStyle,
    pub null_style: NullStyle,
    pub undefined_style: UndefinedStyle,
    pub children_layout: ChildrenLayout,
    pub indent: Indent,
    pub sequence_separator: SequenceSeparator,
    /// Backslash-escape `.` in CSS selectors; the notation reads `.` as a
    /// path separator in keys.
    pub escape_selector_dots: bool,
    pub escaping: EscapeMode,
    /// Field holding the inline text of a leaf element.
    pub text_field: String,
    pub children_field: String,
    pub max_depth: usize,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::json()
    }
}

impl Dialect {
    /// The JSON-flavoured dialect the editor's HTML-to-JSON command has always emitted.
    pub fn json() -> Self {
        Self {
            name: "json".to_string(),
            tag_field: TagField::Key("t".to_string()),
            quote: QuoteStyle::Double,
            separator: Separator::Colon,
            boolean_style: BooleanStyle::Numeric,
            null_style: NullStyle::Lower,
            undefined_style: UndefinedStyle::AsNull,
            children_layout: ChildrenLayout::Array,
            indent: Indent::Tab,
            sequence_separator: SequenceSeparator::CommaNewline,
            escape_selector_dots: false,
            escaping: EscapeMode::Faithful,
            text_field: "html".to_string(),
            children_field: "children".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn opl() -> Self {
        Self {
            name: "opl".to_string(),
            tag_field: TagField::Key("0".to_string()),
            quote: QuoteStyle::Single,
            separator: Separator::Equals,
            null_style: NullStyle::Upper,
            children_layout: ChildrenLayout::KeyedByIndex,
            sequence_separator: SequenceSeparator::Newline,
            escape_selector_dots: true,
            ..Self::json()
        }
    }

    pub fn scl() -> Self {
        Self {
            name: "scl".to_string(),
            tag_field: TagField::Positional,
            separator: Separator::Equals,
            null_style: NullStyle::Upper,
            undefined_style: UndefinedStyle::Omit,
            children_layout: ChildrenLayout::KeyedByTag,
            indent: Indent::Spaces(3),
            sequence_separator: SequenceSeparator::Newline,
            ..Self::json()
        }
    }

    pub fn presets() -> [Dialect; 3] {
        [Self::json(), Self::opl(), Self::scl()]
    }

    pub fn with_escaping(mut self, escaping: EscapeMode) -> Self {
        self.escaping = escaping;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Load a dialect from a JSON config.
    ///
    /// The optional `preset` key picks the base dialect (defaults to `json`);
    /// every other key overrides the matching field of that preset.
    pub fn from_json_str(config: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(config).map_err(|e| NotationError::Config(e.to_string()))?;
        let mut overrides = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(NotationError::Config(format!(
                    "expected an object, found `{}`",
                    other
                )))
            }
        };

        let base = match overrides.remove("preset") {
            Some(serde_json::Value::String(name)) => name.parse::<Dialect>()?,
            Some(other) => {
                return Err(NotationError::Config(format!(
                    "`preset` must be a string, found `{}`",
                    other
                )))
            }
            None => Dialect::json(),
        };

        let mut merged = match serde_json::to_value(&base) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(NotationError::Config(format!(
                    "preset `{}` is not representable",
                    base.name
                )))
            }
        };
        for (key, value) in overrides {
            merged.insert(key, value);
        }

        let dialect: Dialect = serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| NotationError::Config(e.to_string()))?;
        dialect.validate()?;
        tracing::debug!(dialect = %dialect.name, "loaded dialect config");
        Ok(dialect)
    }

    /// Either a preset name (`opl`) or an inline JSON config (`{"preset": ...}`).
    pub fn load(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.starts_with('{') {
            Self::from_json_str(input)
        } else {
            input.parse()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(NotationError::Config("`maxDepth` must be at least 1".into()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(NotationError::Config(format!(
                "`maxDepth` must be at most {}, found {}",
                MAX_DEPTH_LIMIT, self.max_depth
            )));
        }
        if self.text_field.is_empty() || self.children_field.is_empty() {
            return Err(NotationError::Config(
                "`textField` and `childrenField` must not be empty".into(),
            ));
        }
        if let TagField::Key(key) = &self.tag_field {
            if key.is_empty() {
                return Err(NotationError::Config("tag field key must not be empty".into()));
            }
        }
        Ok(())
    }
}

impl FromStr for Dialect {
    type Err = NotationError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::json()),
            "opl" => Ok(Self::opl()),
            "scl" => Ok(Self::scl()),
            other => Err(NotationError::Config(format!("unknown dialect `{}`", other))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
