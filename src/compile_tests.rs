//! End-to-end: source text through parse, serialize and error mapping.

use crate::compile::{compile, compile_batch, compile_css, compile_html, compile_json};
use crate::compile::{CompileInput, SourceKind};
use crate::dialect::{Dialect, EscapeMode};
use crate::error::{NotationError, ERR_ENCODING, ERR_PARSE};
use crate::position::{locate_error, module_id, ResolvedPosition, SourceBundle};
use crate::DEFAULT_MAX_DEPTH;

#[test]
fn test_html_paragraph() {
    assert_eq!(
        compile_html("<p>hi</p>", &Dialect::json()).unwrap(),
        r#"{"t": "p", "html": "hi"}"#
    );
}

#[test]
fn test_html_menu_document() {
    let source = "<!DOCTYPE html>\n<html><head><title>Menu</title></head>\n<body>\n\
                  <!-- main menu -->\n\
                  <ul class=\"menu\">\n  <li>Start</li>\n  <li>Quit</li>\n</ul>\n\
                  <p>v1</p>\n</body></html>";
    assert_eq!(
        compile_html(source, &Dialect::json()).unwrap(),
        "{\"t\": \"ul\", \"class\": \"menu\", \"children\": [\n\
         \t{\"t\": \"li\", \"html\": \"Start\"},\n\
         \t{\"t\": \"li\", \"html\": \"Quit\"}\n\
         ]}\n\
         {\"t\": \"p\", \"html\": \"v1\"}"
    );
}

#[test]
fn test_html_fragment_in_opl() {
    let out = compile_html("<div id=\"hud\"><span>0</span><b>x</b></div>", &Dialect::opl()).unwrap();
    assert_eq!(
        out,
        "{'0' = 'div', 'id' = 'hud', 'children' = {\n\
         \t'0' = {'0' = 'span', 'html' = '0'},\n\
         \t'1' = {'0' = 'b', 'html' = 'x'}\n\
         }}"
    );
}

#[test]
fn test_html_empty_body() {
    assert_eq!(compile_html("", &Dialect::json()).unwrap(), "");
    assert_eq!(compile_html("just text", &Dialect::json()).unwrap(), "");
}

#[test]
fn test_css_rule_in_opl() {
    assert_eq!(
        compile_css(".box { color: red; }", &Dialect::opl()).unwrap(),
        "'\\.box' = {\n\t'color' = 'red'\n}"
    );
}

#[test]
fn test_css_keyframes_and_rules() {
    let source = "/* spinner */\n\
                  @charset \"utf-8\";\n\
                  .spinner, .loader { animation: spin 1s linear infinite; }\n\
                  @keyframes spin {\n  from { transform: rotate(0deg); }\n  to { transform: rotate(360deg); }\n}\n\
                  @media (max-width: 600px) { .spinner { display: none; } }";
    assert_eq!(
        compile_css(source, &Dialect::opl()).unwrap(),
        "'\\.spinner, \\.loader' = {\n\
         \t'animation' = 'spin 1s linear infinite'\n\
         },\n\
         '@keyframes spin' = {\n\
         \t'from' = {\n\t\t'transform' = 'rotate(0deg)'\n\t},\n\
         \t'to' = {\n\t\t'transform' = 'rotate(360deg)'\n\t}\n\
         }"
    );
}

#[test]
fn test_css_vendor_keyframes_are_skipped() {
    let source = "@-webkit-keyframes spin { from { opacity: 0; } }\np { margin: 0; }";
    assert_eq!(
        compile_css(source, &Dialect::opl()).unwrap(),
        "'p' = {\n\t'margin' = '0'\n}"
    );
}

#[test]
fn test_json_document_in_scl() {
    let source = r#"{"name": "hero", "stats": [3, 4.5, false], "guild": null}"#;
    assert_eq!(
        compile_json(source, &Dialect::scl()).unwrap(),
        "{\"name\" = \"hero\", \"stats\" = [3\n4.5\n0], \"guild\" = NULL}"
    );
}

#[test]
fn test_json_key_order_is_kept() {
    let out = compile_json(r#"{"z": 1, "a": 2, "m": 3}"#, &Dialect::opl()).unwrap();
    assert_eq!(out, "{'z' = 1, 'a' = 2, 'm' = 3}");
}

#[test]
fn test_strict_json_output_is_json() {
    let source = r#"{"quote": "say \"hi\"", "path": "C:\\games", "lines": "a\nb"}"#;
    let dialect = Dialect::json().with_escaping(EscapeMode::Strict);
    let out = compile_json(source, &dialect).unwrap();
    let expected: serde_json::Value = serde_json::from_str(source).unwrap();
    let actual: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_parse_errors_carry_format() {
    let err = compile_json("{\"a\": }", &Dialect::json()).unwrap_err();
    assert_eq!(err.code(), ERR_PARSE);
    assert!(matches!(err, NotationError::Parse { format: "json", .. }));

    let err = compile_css("p { color: red", &Dialect::opl()).unwrap_err();
    assert!(matches!(err, NotationError::Parse { format: "css", .. }));
}

fn nested_arrays(depth: usize) -> String {
    format!("{}1{}", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn test_json_depth_limit_comes_from_dialect() {
    let deep = nested_arrays(200);
    let out = compile_json(&deep, &Dialect::json()).unwrap();
    assert!(out.starts_with("[[[") && out.ends_with("1]]]"));

    assert_eq!(
        compile_json(&deep, &Dialect::json().with_max_depth(150)),
        Err(NotationError::DepthExceeded { limit: 150 })
    );
    assert_eq!(
        compile_json(&nested_arrays(DEFAULT_MAX_DEPTH + 1), &Dialect::opl()),
        Err(NotationError::DepthExceeded {
            limit: DEFAULT_MAX_DEPTH
        })
    );
}

#[test]
fn test_non_finite_numbers_fail_to_encode() {
    let value = crate::ir::JsonValue::from(f64::NAN);
    let err = crate::json::serialize_json(&value, &Dialect::json()).unwrap_err();
    assert_eq!(err.code(), ERR_ENCODING);
    assert_eq!(err, NotationError::encoding("NaN"));
}

#[test]
fn test_batch_keeps_order_and_isolates_failures() {
    let inputs = vec![
        CompileInput::new(SourceKind::Html, "<b>1</b>"),
        CompileInput::new(SourceKind::Json, "not json"),
        CompileInput::new(SourceKind::Css, "a { color: blue }"),
        CompileInput::new(SourceKind::Json, "[]"),
    ];
    let results = compile_batch(&inputs, &Dialect::json());
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_deref(), Ok(r#"{"t": "b", "html": "1"}"#));
    assert!(results[1].is_err());
    assert_eq!(
        results[2].as_deref(),
        Ok("\"a\": {\n\t\"color\": \"blue\"\n}")
    );
    assert_eq!(results[3].as_deref(), Ok("[]"));

    for (input, result) in inputs.iter().zip(&results) {
        assert_eq!(result, &compile(&input.source, input.kind, &Dialect::json()));
    }
}

#[test]
fn test_batch_of_nothing() {
    assert!(compile_batch(&[], &Dialect::opl()).is_empty());
}

#[test]
fn test_dialect_config_end_to_end() {
    let dialect = Dialect::load(r#"{"preset": "opl", "escaping": "strict"}"#).unwrap();
    assert_eq!(
        compile_html("<p title=\"it's\">ok</p>", &dialect).unwrap(),
        "{'0' = 'p', 'title' = 'it\\'s', 'html' = 'ok'}"
    );
}

#[test]
fn test_remote_error_maps_back_to_module() {
    let mut bundle = SourceBundle::new();
    bundle.push(module_id("src/main.ts"), "let a = 1;\nlet b = 2;\n");
    bundle.push(module_id("src/game.ts"), "start();\nloop();\nstop();\n");

    let pos = locate_error("Error: ./src/game:3 unknown procedure", &bundle).unwrap();
    assert_eq!(
        pos,
        ResolvedPosition {
            file: "./src/game".to_string(),
            line: 2,
            column: 0,
        }
    );

    let pos = locate_error("Syntax error at line 4:7", &bundle).unwrap();
    assert_eq!(pos.file, "./src/game");
    assert_eq!((pos.line, pos.column), (1, 6));
}

#[test]
fn test_remote_error_maps_back_through_joined_text() {
    let bundle: SourceBundle = vec![("a.ts", "x\ny\n"), ("b.ts", "z\n")]
        .into_iter()
        .collect();
    let joined = bundle.concatenate();
    let pos = locate_error("ReferenceError at line 4:1", &joined).unwrap();
    assert_eq!(
        pos,
        ResolvedPosition {
            file: "b.ts".to_string(),
            line: 0,
            column: 0,
        }
    );
}

#[test]
fn test_unmappable_errors_are_reported() {
    let bundle: SourceBundle = vec![("./a", "x\n")].into_iter().collect();
    assert!(matches!(
        locate_error("something went wrong", &bundle),
        Err(NotationError::MalformedErrorMessage { .. })
    ));
    assert!(matches!(
        locate_error("Error at line 9:1", &bundle),
        Err(NotationError::PositionNotFound { line: 9, .. })
    ));
}
