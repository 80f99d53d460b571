//! Parse Module
//!
//! Front ends that turn source text into the trees the serializers read.
//! HTML goes through html5ever, JSON through serde_json. CSS uses a small
//! rule reader: plain rules and `@keyframes` are kept, every other at-rule is
//! skipped.

use html5ever::parse_document;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use serde::Deserialize;
use tendril::TendrilSink;

use crate::dialect::DEFAULT_MAX_DEPTH;
use crate::error::{NotationError, Result};
use crate::ir::{
    AttributeIR, Declaration, ElementNode, HtmlNode, JsonValue, KeyframeRule, KeyframesBlock,
    PlainRule, StyleRule, Stylesheet, TextNode,
};

lazy_static! {
    /// CSS comments. Replaced by their newlines so reported lines stay right.
    static ref CSS_COMMENT_RE: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// HTML
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse an HTML snippet and return the element children of its `<body>`.
///
/// Top-level text is skipped, as are comments, doctypes and processing
/// instructions anywhere in the tree. Content html5ever hoists into `<head>`
/// (`<title>`, `<meta>`, ...) is not part of the result.
pub fn parse_html(html: &str) -> Result<Vec<ElementNode>> {
    parse_html_with_limit(html, DEFAULT_MAX_DEPTH)
}

pub fn parse_html_with_limit(html: &str, max_depth: usize) -> Result<Vec<ElementNode>> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| NotationError::parse("html", format!("Failed to parse HTML: {}", e)))?;

    let mut nodes = Vec::new();
    collect_body_content(&dom.document, &mut nodes, max_depth)?;
    Ok(nodes)
}

fn collect_body_content(
    handle: &Handle,
    nodes: &mut Vec<ElementNode>,
    max_depth: usize,
) -> Result<()> {
    match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_body_content(child, nodes, max_depth)?;
            }
        }
        NodeData::Element { name, .. } => match &*name.local {
            "html" => {
                for child in handle.children.borrow().iter() {
                    collect_body_content(child, nodes, max_depth)?;
                }
            }
            "body" => {
                for child in handle.children.borrow().iter() {
                    if let Some(element) = convert_element(child, 0, max_depth)? {
                        nodes.push(element);
                    }
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

/// Convert a DOM element. Returns `None` for anything that is not an element.
fn convert_element(handle: &Handle, depth: usize, max_depth: usize) -> Result<Option<ElementNode>> {
    let (name, attrs) = match &handle.data {
        NodeData::Element { name, attrs, .. } => (name, attrs),
        _ => return Ok(None),
    };
    if depth >= max_depth {
        return Err(NotationError::DepthExceeded { limit: max_depth });
    }

    let attributes = attrs
        .borrow()
        .iter()
        .map(|attr| AttributeIR {
            name: attr.name.local.to_string(),
            value: attr.value.to_string(),
        })
        .collect();

    let mut children = Vec::new();
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => children.push(HtmlNode::Text(TextNode {
                value: contents.borrow().to_string(),
            })),
            NodeData::Element { .. } => {
                if let Some(element) = convert_element(child, depth + 1, max_depth)? {
                    children.push(HtmlNode::Element(element));
                }
            }
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. }
            | NodeData::Document => {}
        }
    }

    Ok(Some(ElementNode {
        tag: name.local.to_string(),
        attributes,
        children,
    }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a JSON document, keeping object keys in source order.
pub fn parse_json(text: &str) -> Result<JsonValue> {
    parse_json_with_limit(text, DEFAULT_MAX_DEPTH)
}

/// Like [`parse_json`], failing with `DepthExceeded` when arrays and objects
/// nest deeper than `max_depth`.
pub fn parse_json_with_limit(text: &str, max_depth: usize) -> Result<JsonValue> {
    check_json_nesting(text, max_depth)?;

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = serde_json::Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(JsonValue::from(value))
}

/// Counts open `[`/`{` outside strings. Malformed input is left for
/// serde_json to report.
fn check_json_nesting(text: &str, max_depth: usize) -> Result<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for b in text.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > max_depth {
                    return Err(NotationError::DepthExceeded { limit: max_depth });
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// CSS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn parse_stylesheet(css: &str) -> Result<Stylesheet> {
    let without_comments = CSS_COMMENT_RE.replace_all(css, |caps: &regex::Captures| {
        caps[0].chars().filter(|c| *c == '\n').collect::<String>()
    });
    let chars: Vec<char> = without_comments.chars().collect();
    let mut rules = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let stop = match find_top_level(&chars, i, &['{', ';', '}']) {
            Some(end) => end,
            None => {
                let rest = collect(&chars[i..]);
                return Err(css_error(&chars, i, format!("unterminated rule `{}`", rest.trim())));
            }
        };
        let prelude = collect(&chars[i..stop]).trim().to_string();

        match chars[stop] {
            '}' => return Err(css_error(&chars, stop, "unexpected `}`".to_string())),
            ';' => {
                if prelude.starts_with('@') {
                    tracing::warn!(rule = %prelude, "skipping unsupported at-rule");
                    i = stop + 1;
                    continue;
                }
                return Err(css_error(
                    &chars,
                    i,
                    format!("declaration `{}` outside of a rule", prelude),
                ));
            }
            _ => {}
        }

        let close = find_block_end(&chars, stop)
            .ok_or_else(|| css_error(&chars, stop, format!("unclosed block for `{}`", prelude)))?;
        let body_start = stop + 1;

        if let Some(at_rule) = prelude.strip_prefix('@') {
            let (keyword, name) = match at_rule.find(char::is_whitespace) {
                Some(split) => (&at_rule[..split], at_rule[split..].trim()),
                None => (at_rule, ""),
            };
            if keyword.eq_ignore_ascii_case("keyframes") {
                let keyframes = parse_keyframes(&chars, body_start, close)?;
                rules.push(StyleRule::Keyframes(KeyframesBlock {
                    name: name.to_string(),
                    keyframes,
                }));
            } else {
                tracing::warn!(rule = %prelude, "skipping unsupported at-rule block");
            }
        } else {
            let selectors = split_list(&prelude);
            if selectors.is_empty() {
                return Err(css_error(&chars, stop, "rule without a selector".to_string()));
            }
            let declarations = parse_declarations(&chars, body_start, close)?;
            rules.push(StyleRule::Plain(PlainRule {
                selectors,
                declarations,
            }));
        }

        i = close + 1;
    }

    Ok(Stylesheet { rules })
}

fn parse_keyframes(chars: &[char], start: usize, end: usize) -> Result<Vec<KeyframeRule>> {
    let mut keyframes = Vec::new();
    let mut i = start;

    while i < end {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let open = match find_top_level(chars, i, &['{', ';', '}']) {
            Some(pos) if pos < end && chars[pos] == '{' => pos,
            _ => return Err(css_error(chars, i, "expected a keyframe block".to_string())),
        };
        let close = match find_block_end(chars, open) {
            Some(pos) if pos < end => pos,
            _ => return Err(css_error(chars, open, "unclosed keyframe block".to_string())),
        };

        let selectors = split_list(&collect(&chars[i..open]));
        if selectors.is_empty() {
            return Err(css_error(chars, open, "keyframe without a selector".to_string()));
        }
        keyframes.push(KeyframeRule {
            selectors,
            declarations: parse_declarations(chars, open + 1, close)?,
        });
        i = close + 1;
    }

    Ok(keyframes)
}

/// Declarations between `start` and `end` (exclusive), in source order.
fn parse_declarations(chars: &[char], start: usize, end: usize) -> Result<Vec<Declaration>> {
    let mut declarations = Vec::new();
    let mut i = start;

    while i < end {
        let stop = find_top_level(chars, i, &[';', '{', '}'])
            .filter(|pos| *pos < end)
            .unwrap_or(end);
        if stop < end && chars[stop] == '{' {
            return Err(css_error(chars, stop, "nested rules are not supported".to_string()));
        }

        let text = collect(&chars[i..stop]);
        let text = text.trim();
        if !text.is_empty() {
            let (property, value) = text.split_once(':').ok_or_else(|| {
                css_error(chars, i, format!("expected `:` in declaration `{}`", text))
            })?;
            let property = property.trim();
            if property.is_empty() {
                return Err(css_error(chars, i, format!("missing property in `{}`", text)));
            }
            declarations.push(Declaration::new(property, value.trim()));
        }

        i = stop + 1;
    }

    Ok(declarations)
}

/// Split a selector list on top-level commas. `:is(a, b)` stays whole.
fn split_list(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut items = Vec::new();
    let mut i = 0;

    loop {
        let end = find_top_level(&chars, i, &[',']).unwrap_or(chars.len());
        let item = collect(&chars[i..end]);
        let item = item.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
        if end >= chars.len() {
            break;
        }
        i = end + 1;
    }

    items
}

/// First index at or after `start` holding one of `stops`, outside strings
/// and outside `(...)` / `[...]` groups.
fn find_top_level(chars: &[char], start: usize, stops: &[char]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => in_string = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 && stops.contains(&c) => return Some(i),
            _ => {}
        }
        i += 1;
    }

    None
}

/// Index of the `}` closing the `{` at `open`, skipping strings.
fn find_block_end(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut i = open;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => in_string = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn css_error(chars: &[char], at: usize, message: String) -> NotationError {
    let line = chars[..at.min(chars.len())]
        .iter()
        .filter(|c| **c == '\n')
        .count()
        + 1;
    NotationError::parse("css", format!("line {}: {}", line, message))
}
