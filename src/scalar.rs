//! Scalar Encoder
//!
//! Owns every literal spelling of the notation: strings (and their escaping),
//! numbers, booleans, null, plus the two composite shapes (mapping and
//! sequence) that all tree serializers build on.

use std::borrow::Cow;

use crate::dialect::{BooleanStyle, Dialect, EscapeMode};
use crate::error::{NotationError, Result};
use crate::ir::{JsonValue, Number};

#[derive(Debug, Clone, Copy)]
pub struct ScalarEncoder<'d> {
    dialect: &'d Dialect,
}

impl<'d> ScalarEncoder<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'d Dialect {
        self.dialect
    }

    /// Encode any JSON value. Composite values are handed to the JSON tree
    /// serializer so the depth guard applies.
    pub fn encode(&self, value: &JsonValue) -> Result<String> {
        match value {
            JsonValue::Null => Ok(self.null().to_string()),
            JsonValue::Undefined => Ok(self.undefined().to_string()),
            JsonValue::Bool(b) => Ok(self.boolean(*b).to_string()),
            JsonValue::Number(n) => self.number(n),
            JsonValue::String(s) => Ok(self.string(s)),
            JsonValue::Object(_) | JsonValue::Array(_) => {
                crate::json::serialize_json(value, self.dialect)
            }
        }
    }

    /// Quote a string in the dialect's quote character.
    pub fn string(&self, raw: &str) -> String {
        let quote = self.dialect.quote.char();
        let body = self.escape(raw);
        let mut out = String::with_capacity(body.len() + 2);
        out.push(quote);
        out.push_str(&body);
        out.push(quote);
        out
    }

    /// Object keys are quoted exactly like string values.
    pub fn key(&self, raw: &str) -> String {
        self.string(raw)
    }

    pub fn number(&self, n: &Number) -> Result<String> {
        if !n.is_finite() {
            return Err(NotationError::encoding(n.kind()));
        }
        Ok(n.to_string())
    }

    pub fn boolean(&self, b: bool) -> &'static str {
        match (self.dialect.boolean_style, b) {
            (BooleanStyle::Numeric, true) => "1",
            (BooleanStyle::Numeric, false) => "0",
            (BooleanStyle::Literal, true) => "true",
            (BooleanStyle::Literal, false) => "false",
        }
    }

    pub fn null(&self) -> &'static str {
        self.dialect.null_style.as_str()
    }

    /// Literal used where an `undefined` value cannot simply be left out.
    pub fn undefined(&self) -> &'static str {
        self.null()
    }

    /// `"key" = value` / `"key": value`. `value` is already encoded.
    pub fn entry(&self, key: &str, value: &str) -> String {
        format!("{}{}{}", self.key(key), self.dialect.separator.as_str(), value)
    }

    /// `{` + comma-joined entries + `}`. Entries are already encoded.
    pub fn mapping<I>(&self, entries: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        format!("{{{}}}", entries.into_iter().collect::<Vec<_>>().join(", "))
    }

    /// `[` + items joined by the dialect's sequence separator + `]`.
    pub fn sequence<I>(&self, items: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let items: Vec<String> = items.into_iter().collect();
        format!(
            "[{}]",
            items.join(self.dialect.sequence_separator.as_str())
        )
    }

    /// String body escaping. `Faithful` leaves the text untouched.
    pub fn escape<'s>(&self, raw: &'s str) -> Cow<'s, str> {
        if self.dialect.escaping == EscapeMode::Faithful {
            return Cow::Borrowed(raw);
        }

        let quote = self.dialect.quote.char();
        if !raw
            .chars()
            .any(|c| c == '\\' || c == quote || c.is_control())
        {
            return Cow::Borrowed(raw);
        }

        let mut out = String::with_capacity(raw.len() + 8);
        for c in raw.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        Cow::Owned(out)
    }
}
