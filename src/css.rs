//! CSS Rule Serializer
//!
//! ```text
//! '\.box, \.panel' = {
//!     'color' = 'red',
//!     'margin' = '0 auto'
//! }
//! ```
//!
//! Keyframe blocks nest one level deeper, each keyframe encoded like a plain
//! rule keyed by its keyframe selectors.

use crate::dialect::Dialect;
use crate::error::{NotationError, Result};
use crate::ir::{Declaration, KeyframesBlock, Stylesheet, StyleRule};
use crate::scalar::ScalarEncoder;

pub fn serialize_rule(rule: &StyleRule, dialect: &Dialect) -> Result<String> {
    CssSerializer::new(dialect).serialize_rule(rule, 0)
}

/// All rules of a stylesheet, comma-separated, one per line.
pub fn serialize_stylesheet(sheet: &Stylesheet, dialect: &Dialect) -> Result<String> {
    let serializer = CssSerializer::new(dialect);
    let rules = sheet
        .rules
        .iter()
        .map(|rule| serializer.serialize_rule(rule, 0))
        .collect::<Result<Vec<_>>>()?;
    Ok(rules.join(",\n"))
}

pub struct CssSerializer<'d> {
    encoder: ScalarEncoder<'d>,
}

impl<'d> CssSerializer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            encoder: ScalarEncoder::new(dialect),
        }
    }

    pub fn serialize_rule(&self, rule: &StyleRule, depth: usize) -> Result<String> {
        match rule {
            StyleRule::Plain(plain) => {
                self.declaration_block(&plain.selectors, &plain.declarations, depth)
            }
            StyleRule::Keyframes(block) => self.keyframes(block, depth),
        }
    }

    fn keyframes(&self, block: &KeyframesBlock, depth: usize) -> Result<String> {
        self.check_depth(depth)?;
        let dialect = self.encoder.dialect();
        let key = self.selector_key(&format!("@keyframes {}", block.name));

        let frames = block
            .keyframes
            .iter()
            .map(|frame| {
                let body =
                    self.declaration_block(&frame.selectors, &frame.declarations, depth + 1)?;
                Ok(format!("{}{}", dialect.indent.at(depth + 1), body))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.block(&key, frames, depth))
    }

    /// `'<selectors>' = { '<property>' = '<value>', ... }`
    fn declaration_block(
        &self,
        selectors: &[String],
        declarations: &[Declaration],
        depth: usize,
    ) -> Result<String> {
        self.check_depth(depth)?;
        let dialect = self.encoder.dialect();
        let key = self.selector_key(&selectors.join(", "));
        let inner = dialect.indent.at(depth + 1);

        let lines = declarations
            .iter()
            .map(|decl| {
                let value = self.encoder.string(&decl.value);
                format!("{}{}", inner, self.encoder.entry(&decl.property, &value))
            })
            .collect();

        Ok(self.block(&key, lines, depth))
    }

    fn block(&self, key: &str, lines: Vec<String>, depth: usize) -> String {
        let dialect = self.encoder.dialect();
        let body = if lines.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{}\n{}}}", lines.join(",\n"), dialect.indent.at(depth))
        };
        format!("{}{}{}", key, dialect.separator.as_str(), body)
    }

    /// Quote selector text, escaping `.` when the dialect asks for it. String
    /// escaping runs first so the inserted backslashes survive.
    fn selector_key(&self, selector: &str) -> String {
        let dialect = self.encoder.dialect();
        let escaped = self.encoder.escape(selector);
        let body = if dialect.escape_selector_dots {
            escaped.replace('.', "\\.")
        } else {
            escaped.into_owned()
        };
        let quote = dialect.quote.char();
        format!("{}{}{}", quote, body, quote)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        let limit = self.encoder.dialect().max_depth;
        if depth >= limit {
            return Err(NotationError::DepthExceeded { limit });
        }
        Ok(())
    }
}
