use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_ENCODING: &str = "OPL-ERR-ENCODE";
pub const ERR_DEPTH_EXCEEDED: &str = "OPL-ERR-DEPTH";
pub const ERR_POSITION_NOT_FOUND: &str = "OPL-ERR-POSITION";
pub const ERR_MALFORMED_MESSAGE: &str = "OPL-ERR-MESSAGE";
pub const ERR_PARSE: &str = "OPL-ERR-PARSE";
pub const ERR_CONFIG: &str = "OPL-ERR-CONFIG";

/// Errors produced by the notation compiler.
///
/// Every failure is local and synchronous. None of them is fatal to the host
/// process; the editor glue decides how to present them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotationError {
    /// A value reached the scalar encoder that has no notation literal.
    #[error("cannot encode a value of kind `{kind}` as notation")]
    Encoding { kind: String },

    #[error("nesting depth exceeded the limit of {limit}")]
    DepthExceeded { limit: usize },

    /// The global line does not fall inside any file of the bundle.
    #[error("line {line} is outside the bundle ({total_lines} lines in {files} files)")]
    PositionNotFound {
        line: u32,
        total_lines: u32,
        files: usize,
    },

    /// The remote compiler message carries no recognisable location.
    /// Displays as the untouched message text.
    #[error("{raw}")]
    MalformedErrorMessage { raw: String },

    #[error("failed to parse {format} input: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("invalid dialect configuration: {0}")]
    Config(String),
}

impl NotationError {
    pub fn encoding(kind: impl Into<String>) -> Self {
        NotationError::Encoding { kind: kind.into() }
    }

    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        NotationError::Parse {
            format,
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            NotationError::Encoding { .. } => ERR_ENCODING,
            NotationError::DepthExceeded { .. } => ERR_DEPTH_EXCEEDED,
            NotationError::PositionNotFound { .. } => ERR_POSITION_NOT_FOUND,
            NotationError::MalformedErrorMessage { .. } => ERR_MALFORMED_MESSAGE,
            NotationError::Parse { .. } => ERR_PARSE,
            NotationError::Config(_) => ERR_CONFIG,
        }
    }
}

impl From<serde_json::Error> for NotationError {
    fn from(err: serde_json::Error) -> Self {
        NotationError::parse("json", err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            NotationError::encoding("NaN"),
            NotationError::DepthExceeded { limit: 4 },
            NotationError::PositionNotFound {
                line: 9,
                total_lines: 3,
                files: 2,
            },
            NotationError::MalformedErrorMessage {
                raw: "boom".to_string(),
            },
            NotationError::parse("css", "unexpected `}`"),
            NotationError::Config("bad".to_string()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_malformed_message_displays_raw_text() {
        let err = NotationError::MalformedErrorMessage {
            raw: "TypeError: x is not a function".to_string(),
        };
        assert_eq!(err.to_string(), "TypeError: x is not a function");
    }
}
