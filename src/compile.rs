//! Compile Entry Points
//!
//! Source text in, notation text out. Each entry point is parse followed by
//! serialize, with the dialect's depth limit applied to both halves.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::css::serialize_stylesheet;
use crate::dialect::Dialect;
use crate::error::{NotationError, Result};
use crate::html::serialize_elements;
use crate::json::serialize_json;
use crate::parse::{parse_html_with_limit, parse_json_with_limit, parse_stylesheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Html,
    Json,
    Css,
}

impl SourceKind {
    /// Guess the kind from a file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(SourceKind::Html),
            "json" => Some(SourceKind::Json),
            "css" => Some(SourceKind::Css),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Html => "html",
            SourceKind::Json => "json",
            SourceKind::Css => "css",
        }
    }
}

impl FromStr for SourceKind {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(SourceKind::Html),
            "json" => Ok(SourceKind::Json),
            "css" => Ok(SourceKind::Css),
            other => Err(NotationError::Config(format!(
                "unknown source kind '{}', expected html, json or css",
                other
            ))),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileInput {
    pub kind: SourceKind,
    pub source: String,
}

impl CompileInput {
    pub fn new(kind: SourceKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

/// Body-level elements of an HTML document, one notation object per line.
pub fn compile_html(source: &str, dialect: &Dialect) -> Result<String> {
    let nodes = parse_html_with_limit(source, dialect.max_depth)?;
    serialize_elements(&nodes, dialect)
}

pub fn compile_json(source: &str, dialect: &Dialect) -> Result<String> {
    let value = parse_json_with_limit(source, dialect.max_depth)?;
    serialize_json(&value, dialect)
}

/// Supported stylesheet rules, one notation entry per rule.
pub fn compile_css(source: &str, dialect: &Dialect) -> Result<String> {
    let sheet = parse_stylesheet(source)?;
    serialize_stylesheet(&sheet, dialect)
}

pub fn compile(source: &str, kind: SourceKind, dialect: &Dialect) -> Result<String> {
    tracing::debug!(kind = %kind, dialect = %dialect, bytes = source.len(), "compiling");
    let result = match kind {
        SourceKind::Html => compile_html(source, dialect),
        SourceKind::Json => compile_json(source, dialect),
        SourceKind::Css => compile_css(source, dialect),
    };
    if let Err(err) = &result {
        tracing::debug!(kind = %kind, code = err.code(), error = %err, "compile failed");
    }
    result
}

/// Compile independent inputs in parallel. Results keep input order and one
/// failure does not affect the others.
pub fn compile_batch(inputs: &[CompileInput], dialect: &Dialect) -> Vec<Result<String>> {
    tracing::debug!(inputs = inputs.len(), dialect = %dialect, "compiling batch");
    inputs
        .par_iter()
        .map(|input| compile(&input.source, input.kind, dialect))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn napi_dialect(dialect: Option<String>) -> napi::Result<Dialect> {
    match dialect {
        Some(input) => Dialect::load(&input).map_err(|e| napi::Error::from_reason(e.to_string())),
        None => Ok(Dialect::default()),
    }
}

/// `dialect` is a preset name or a JSON dialect config; defaults to `json`.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_native(
    source: String,
    kind: String,
    dialect: Option<String>,
) -> napi::Result<String> {
    let kind: SourceKind = kind
        .parse()
        .map_err(|e: NotationError| napi::Error::from_reason(e.to_string()))?;
    let dialect = napi_dialect(dialect)?;
    compile(&source, kind, &dialect).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_html_native(source: String, dialect: Option<String>) -> napi::Result<String> {
    let dialect = napi_dialect(dialect)?;
    compile_html(&source, &dialect).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_json_native(source: String, dialect: Option<String>) -> napi::Result<String> {
    let dialect = napi_dialect(dialect)?;
    compile_json(&source, &dialect).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_css_native(source: String, dialect: Option<String>) -> napi::Result<String> {
    let dialect = napi_dialect(dialect)?;
    compile_css(&source, &dialect).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Returns `None` when the message cannot be mapped; show it unmodified.
#[cfg(feature = "napi")]
#[napi]
pub fn locate_error_native(
    message: String,
    files: Vec<crate::position::SourceFile>,
) -> Option<crate::position::ResolvedPosition> {
    let bundle: crate::position::SourceBundle =
        files.into_iter().map(|file| (file.id, file.text)).collect();
    crate::position::locate_error(&message, &bundle).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path("ui/menu.html"), Some(SourceKind::Html));
        assert_eq!(SourceKind::from_path("INDEX.HTM"), Some(SourceKind::Html));
        assert_eq!(SourceKind::from_path("data/level.json"), Some(SourceKind::Json));
        assert_eq!(SourceKind::from_path("theme.css"), Some(SourceKind::Css));
        assert_eq!(SourceKind::from_path("game.ts"), None);
        assert_eq!(SourceKind::from_path("Makefile"), None);
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("CSS".parse::<SourceKind>().unwrap(), SourceKind::Css);
        let err = "xml".parse::<SourceKind>().unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_CONFIG);
    }

    #[test]
    fn test_compile_dispatches_by_kind() {
        let dialect = Dialect::json();
        assert_eq!(
            compile("<p>hi</p>", SourceKind::Html, &dialect).unwrap(),
            r#"{"t": "p", "html": "hi"}"#
        );
        assert_eq!(compile("[1, true]", SourceKind::Json, &dialect).unwrap(), "[1,\n1]");
        assert_eq!(
            compile("p { margin: 0 }", SourceKind::Css, &dialect).unwrap(),
            "\"p\": {\n\t\"margin\": \"0\"\n}"
        );
    }

    #[test]
    fn test_html_depth_limit_comes_from_dialect() {
        let dialect = Dialect::json().with_max_depth(2);
        let err = compile_html("<div><div><div>x</div></div></div>", &dialect).unwrap_err();
        assert_eq!(err, NotationError::DepthExceeded { limit: 2 });
    }
}
