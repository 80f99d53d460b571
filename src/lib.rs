//! # OPL Notation Compiler
//!
//! Turns HTML, JSON and CSS sources into the object notation read by the
//! remote OPL/SCL compiler, and maps the remote compiler's errors back onto
//! the files that were sent.
//!
//! ## Output Invariants
//!
//! 1. **Deterministic**: the same input and [`Dialect`] always produce the same
//!    bytes. Source order is kept everywhere: attributes, object keys, selectors,
//!    declarations, keyframes.
//!
//! 2. **One object per element**: the tag comes first, then attributes, then
//!    either the inline text (`html`) or the nested `children` collection,
//!    never both.
//!
//! 3. **Indentation**: a nested child sits exactly one indent unit deeper than
//!    its parent. Closing brackets line up with the parent's own indent.
//!
//! 4. **Bounded recursion**: every tree walk stops at `Dialect::max_depth` with
//!    [`NotationError::DepthExceeded`] instead of overflowing the stack.
//!
//! 5. **Non-finite numbers are rejected**: `NaN` and `Infinity` have no notation
//!    literal and raise [`NotationError::Encoding`].
//!
//! ## Positions
//!
//! Lines reported by the remote compiler are one-based. [`ResolvedPosition`]
//! is zero-based. A bundle line maps to the first file whose cumulative line
//! count reaches it.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod compile;
mod css;
mod dialect;
mod error;
mod html;
mod ir;
mod json;
mod parse;
mod position;
mod scalar;

#[cfg(test)]
mod compile_tests;

pub use compile::{
    compile, compile_batch, compile_css, compile_html, compile_json, CompileInput, SourceKind,
};
pub use css::{serialize_rule, serialize_stylesheet, CssSerializer};
pub use dialect::{
    BooleanStyle, ChildrenLayout, Dialect, EscapeMode, Indent, NullStyle, QuoteStyle,
    SequenceSeparator, Separator, TagField, UndefinedStyle, DEFAULT_MAX_DEPTH,
    MAX_DEPTH_LIMIT,
};
pub use error::*;
pub use html::{serialize_element, serialize_elements, HtmlSerializer};
pub use ir::*;
pub use json::{serialize_json, JsonSerializer};
pub use parse::{
    parse_html, parse_html_with_limit, parse_json, parse_json_with_limit, parse_stylesheet,
};
pub use position::{
    locate_error, module_id, BundleLines, ConcatenatedBundle, ErrorLocation, ResolvedPosition,
    SourceBundle, SourceFile,
};
pub use scalar::ScalarEncoder;

#[cfg(feature = "napi")]
pub use compile::{
    compile_css_native, compile_html_native, compile_json_native, compile_native,
    locate_error_native,
};

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "OPL Native Bridge Connected".to_string()
}
