//! HTML Tree Serializer
//!
//! One notation object per element:
//!
//! ```text
//! {"t": "ul", "class": "menu", "children": [
//!     {"t": "li", "html": "Start"},
//!     {"t": "li", "html": "Quit"}
//! ]}
//! ```
//!
//! An element whose only child is text gets the text inline. Otherwise its
//! element children are nested and any text between them is dropped.

use crate::dialect::{ChildrenLayout, Dialect, TagField};
use crate::error::{NotationError, Result};
use crate::ir::ElementNode;
use crate::scalar::ScalarEncoder;

/// Serialize `node` at `depth`, prefixed with that depth's indentation.
pub fn serialize_element(node: &ElementNode, dialect: &Dialect, depth: usize) -> Result<String> {
    HtmlSerializer::new(dialect).serialize(node, depth)
}

/// Serialize sibling top-level elements, one per line.
pub fn serialize_elements(nodes: &[ElementNode], dialect: &Dialect) -> Result<String> {
    let serializer = HtmlSerializer::new(dialect);
    let objects = nodes
        .iter()
        .map(|node| serializer.serialize(node, 0))
        .collect::<Result<Vec<_>>>()?;
    Ok(objects.join("\n"))
}

pub struct HtmlSerializer<'d> {
    encoder: ScalarEncoder<'d>,
}

impl<'d> HtmlSerializer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            encoder: ScalarEncoder::new(dialect),
        }
    }

    pub fn serialize(&self, node: &ElementNode, depth: usize) -> Result<String> {
        let indent = self.encoder.dialect().indent.at(depth);
        Ok(format!("{}{}", indent, self.element_object(node, depth)?))
    }

    fn element_object(&self, node: &ElementNode, depth: usize) -> Result<String> {
        let dialect = self.encoder.dialect();
        if depth >= dialect.max_depth {
            return Err(NotationError::DepthExceeded {
                limit: dialect.max_depth,
            });
        }
        tracing::trace!(tag = %node.tag, depth, "serializing element");

        let enc = &self.encoder;
        let mut fields = Vec::with_capacity(node.attributes.len() + 2);

        fields.push(match &dialect.tag_field {
            TagField::Key(key) => enc.entry(key, &enc.string(&node.tag)),
            TagField::Positional => enc.string(&node.tag),
        });

        for attr in &node.attributes {
            fields.push(enc.entry(&attr.name, &enc.string(&attr.value)));
        }

        if let Some(text) = node.inline_text() {
            fields.push(enc.entry(&dialect.text_field, &enc.string(text)));
        } else if !node.children.is_empty() {
            let children = self.children_collection(node, depth)?;
            fields.push(enc.entry(&dialect.children_field, &children));
        }

        Ok(enc.mapping(fields))
    }

    fn children_collection(&self, node: &ElementNode, depth: usize) -> Result<String> {
        let dialect = self.encoder.dialect();
        let inner = dialect.indent.at(depth + 1);

        let mut items = Vec::new();
        for (index, child) in node.element_children().enumerate() {
            let object = self.element_object(child, depth + 1)?;
            let item = match dialect.children_layout {
                ChildrenLayout::Array => object,
                ChildrenLayout::KeyedByTag => self.encoder.entry(&child.tag, &object),
                ChildrenLayout::KeyedByIndex => {
                    self.encoder.entry(&index.to_string(), &object)
                }
            };
            items.push(format!("{}{}", inner, item));
        }

        let (open, close) = match dialect.children_layout {
            ChildrenLayout::Array => ('[', ']'),
            ChildrenLayout::KeyedByTag | ChildrenLayout::KeyedByIndex => ('{', '}'),
        };

        if items.is_empty() {
            return Ok(format!("{}{}", open, close));
        }

        Ok(format!(
            "{}\n{}\n{}{}",
            open,
            items.join(",\n"),
            dialect.indent.at(depth),
            close
        ))
    }
}
