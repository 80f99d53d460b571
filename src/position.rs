//! Bundle Position Resolver
//!
//! The remote compiler reports errors against the whole bundle it received:
//! either one newline-joined string or a map of module id to source. This
//! module walks the bundle back to the file and local line the error points
//! at, and pulls the location out of the raw error text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::error::{NotationError, Result};

lazy_static! {
    /// `... at line 12:5` - location inside the joined bundle.
    static ref BUNDLE_LOCATION_RE: Regex = Regex::new(r"\bat line (\d+):(\d+)").unwrap();

    /// `Error: ./src/game:12` or `Error: ./src/game:12:5` - location inside a module.
    static ref MODULE_LOCATION_RE: Regex =
        Regex::new(r"^Error: (\..*?):(\d+)(?::(\d+))?").unwrap();
}

/// A location inside one file of the bundle. Line and column are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPosition {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
pub struct SourceFile {
    pub id: String,
    pub text: String,
}

/// Either form of a bundle the remote compiler may report errors against.
pub trait BundleLines {
    /// Resolve a 1-based `line`:`column` counted over the whole bundle.
    fn resolve_line(&self, line: u32, column: u32) -> Result<ResolvedPosition>;

    /// Source of the module with bundle id `id`.
    fn module_text(&self, id: &str) -> Option<&str>;
}

/// Files compiled together, in bundle order, kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    files: Vec<SourceFile>,
}

impl SourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.files.push(SourceFile {
            id: id.into(),
            text: text.into(),
        });
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn get(&self, id: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_lines(&self) -> u32 {
        self.files.iter().map(|f| held_line_count(&f.text)).sum()
    }

    /// Resolve a 1-based `line`:`column` counted over the files in order.
    pub fn resolve(&self, line: u32, column: u32) -> Result<ResolvedPosition> {
        let counts: Vec<(&str, u32)> = self
            .files
            .iter()
            .map(|f| (f.id.as_str(), held_line_count(&f.text)))
            .collect();
        walk_line_counts(&counts, line, column)
    }

    /// Join every file with a single `\n`, remembering where each one sits.
    pub fn concatenate(&self) -> ConcatenatedBundle {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(self.files.len());
        for (i, file) in self.files.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            let start = text.len();
            text.push_str(&file.text);
            spans.push((file.id.clone(), start..text.len()));
        }
        ConcatenatedBundle { text, spans }
    }
}

impl<I, T> FromIterator<(I, T)> for SourceBundle
where
    I: Into<String>,
    T: Into<String>,
{
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let mut bundle = SourceBundle::new();
        for (id, text) in iter {
            bundle.push(id, text);
        }
        bundle
    }
}

impl BundleLines for SourceBundle {
    fn resolve_line(&self, line: u32, column: u32) -> Result<ResolvedPosition> {
        self.resolve(line, column)
    }

    fn module_text(&self, id: &str) -> Option<&str> {
        self.get(id).map(|file| file.text.as_str())
    }
}

/// The bundle as the single string that was sent to the remote compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatenatedBundle {
    text: String,
    spans: Vec<(String, Range<usize>)>,
}

impl ConcatenatedBundle {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolve a 1-based `line`:`column` of the joined text. Each file covers
    /// its embedded newlines plus one lines of it.
    pub fn resolve(&self, line: u32, column: u32) -> Result<ResolvedPosition> {
        let counts: Vec<(&str, u32)> = self
            .spans
            .iter()
            .map(|(id, span)| {
                let newlines = self.text[span.clone()].matches('\n').count();
                (id.as_str(), to_u32(newlines + 1))
            })
            .collect();
        walk_line_counts(&counts, line, column)
    }
}

impl BundleLines for ConcatenatedBundle {
    fn resolve_line(&self, line: u32, column: u32) -> Result<ResolvedPosition> {
        self.resolve(line, column)
    }

    fn module_text(&self, id: &str) -> Option<&str> {
        self.spans
            .iter()
            .find(|(span_id, _)| span_id == id)
            .map(|(_, span)| &self.text[span.clone()])
    }
}

/// Lines a file actually holds: a trailing newline ends the last line
/// instead of opening an empty one.
fn held_line_count(text: &str) -> u32 {
    to_u32(text.lines().count())
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn walk_line_counts(counts: &[(&str, u32)], line: u32, column: u32) -> Result<ResolvedPosition> {
    let not_found = || NotationError::PositionNotFound {
        line,
        total_lines: counts.iter().map(|(_, c)| *c).fold(0u32, u32::saturating_add),
        files: counts.len(),
    };

    let mut offset = line.checked_sub(1).ok_or_else(not_found)?;
    for (id, count) in counts {
        if offset < *count {
            return Ok(ResolvedPosition {
                file: id.to_string(),
                line: offset,
                column: column.saturating_sub(1),
            });
        }
        offset -= count;
    }

    Err(not_found())
}

// ═══════════════════════════════════════════════════════════════════════════════
// REMOTE ERROR MESSAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Location carried by a remote compiler error message. Values are 1-based,
/// as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    Bundle { line: u32, column: u32 },
    Module {
        id: String,
        line: u32,
        column: Option<u32>,
    },
}

impl ErrorLocation {
    pub fn parse(message: &str) -> Result<Self> {
        let malformed = || NotationError::MalformedErrorMessage {
            raw: message.to_string(),
        };
        let number = |m: Option<regex::Match<'_>>| -> Result<u32> {
            m.ok_or_else(malformed)?
                .as_str()
                .parse::<u32>()
                .map_err(|_| malformed())
        };

        if let Some(caps) = MODULE_LOCATION_RE.captures(message) {
            let id = caps.get(1).ok_or_else(malformed)?.as_str().to_string();
            let line = number(caps.get(2))?;
            let column = match caps.get(3) {
                Some(m) => Some(number(Some(m))?),
                None => None,
            };
            return Ok(ErrorLocation::Module { id, line, column });
        }

        if let Some(caps) = BUNDLE_LOCATION_RE.captures(message) {
            return Ok(ErrorLocation::Bundle {
                line: number(caps.get(1))?,
                column: number(caps.get(2))?,
            });
        }

        Err(malformed())
    }
}

/// Map a raw remote compiler error onto a file of `bundle`.
///
/// Callers fall back to showing `message` unmodified when this fails.
pub fn locate_error<B>(message: &str, bundle: &B) -> Result<ResolvedPosition>
where
    B: BundleLines + ?Sized,
{
    let location = ErrorLocation::parse(message).map_err(|err| {
        tracing::warn!(raw = message, "remote error carries no location");
        err
    })?;

    let resolved = match location {
        ErrorLocation::Bundle { line, column } => bundle.resolve_line(line, column),
        ErrorLocation::Module { id, line, column } => resolve_in_module(bundle, &id, line, column),
    };

    match &resolved {
        Ok(pos) => tracing::debug!(file = %pos.file, line = pos.line, "mapped remote error"),
        Err(err) => tracing::warn!(error = %err, "remote error location is outside the bundle"),
    }
    resolved
}

fn resolve_in_module<B: BundleLines + ?Sized>(
    bundle: &B,
    id: &str,
    line: u32,
    column: Option<u32>,
) -> Result<ResolvedPosition> {
    let not_found = |total_lines| NotationError::PositionNotFound {
        line,
        total_lines,
        files: 1,
    };

    let text = bundle.module_text(id).ok_or_else(|| not_found(0))?;
    let count = held_line_count(text).max(1);
    if line == 0 || line > count {
        return Err(not_found(count));
    }

    Ok(ResolvedPosition {
        file: id.to_string(),
        line: line - 1,
        column: column.unwrap_or(1).saturating_sub(1),
    })
}

/// Bundle id of a workspace file: `./`-relative, extension stripped.
///
/// `src/game.ts` becomes `./src/game`.
pub fn module_id(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./").trim_start_matches('/');

    let (dir, file) = match trimmed.rfind('/') {
        Some(i) => (&trimmed[..=i], &trimmed[i + 1..]),
        None => ("", trimmed),
    };
    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    };

    format!("./{}{}", dir, stem)
}
