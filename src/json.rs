//! JSON Tree Serializer

use crate::dialect::{Dialect, UndefinedStyle};
use crate::error::{NotationError, Result};
use crate::ir::JsonValue;
use crate::scalar::ScalarEncoder;

/// Serialize a JSON value into the notation of `dialect`.
pub fn serialize_json(value: &JsonValue, dialect: &Dialect) -> Result<String> {
    JsonSerializer::new(dialect).serialize(value)
}

pub struct JsonSerializer<'d> {
    encoder: ScalarEncoder<'d>,
}

impl<'d> JsonSerializer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            encoder: ScalarEncoder::new(dialect),
        }
    }

    pub fn serialize(&self, value: &JsonValue) -> Result<String> {
        self.serialize_value(value, 0)
    }

    fn serialize_value(&self, value: &JsonValue, depth: usize) -> Result<String> {
        let dialect = self.encoder.dialect();
        match value {
            JsonValue::Object(entries) => {
                if depth >= dialect.max_depth {
                    return Err(NotationError::DepthExceeded {
                        limit: dialect.max_depth,
                    });
                }
                let omit_undefined = dialect.undefined_style == UndefinedStyle::Omit;
                let mut fields = Vec::with_capacity(entries.len());
                for (key, entry) in entries {
                    if omit_undefined && *entry == JsonValue::Undefined {
                        continue;
                    }
                    let encoded = self.serialize_value(entry, depth + 1)?;
                    fields.push(self.encoder.entry(key, &encoded));
                }
                Ok(self.encoder.mapping(fields))
            }
            JsonValue::Array(items) => {
                if depth >= dialect.max_depth {
                    return Err(NotationError::DepthExceeded {
                        limit: dialect.max_depth,
                    });
                }
                let items = items
                    .iter()
                    .map(|item| self.serialize_value(item, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.encoder.sequence(items))
            }
            scalar => self.encoder.encode(scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::EscapeMode;

    fn sample() -> JsonValue {
        JsonValue::object(vec![
            ("name", JsonValue::from("hero")),
            ("level", JsonValue::from(3i64)),
            ("alive", JsonValue::from(true)),
            ("guild", JsonValue::Null),
            ("nickname", JsonValue::Undefined),
        ])
    }

    #[test]
    fn test_object_in_json_dialect() {
        let out = serialize_json(&sample(), &Dialect::json()).unwrap();
        assert_eq!(
            out,
            r#"{"name": "hero", "level": 3, "alive": 1, "guild": null, "nickname": null}"#
        );
    }

    #[test]
    fn test_object_in_opl_dialect() {
        let out = serialize_json(&sample(), &Dialect::opl()).unwrap();
        assert_eq!(
            out,
            "{'name' = 'hero', 'level' = 3, 'alive' = 1, 'guild' = NULL, 'nickname' = NULL}"
        );
    }

    #[test]
    fn test_scl_dialect_omits_undefined_fields() {
        let out = serialize_json(&sample(), &Dialect::scl()).unwrap();
        assert_eq!(
            out,
            r#"{"name" = "hero", "level" = 3, "alive" = 1, "guild" = NULL}"#
        );
    }

    #[test]
    fn test_undefined_in_array_falls_back_to_null() {
        let value = JsonValue::Array(vec![JsonValue::Undefined, JsonValue::from(1i64)]);
        assert_eq!(serialize_json(&value, &Dialect::scl()).unwrap(), "[NULL\n1]");
    }

    #[test]
    fn test_arrays() {
        let value = JsonValue::object(vec![(
            "items",
            JsonValue::Array(vec![
                JsonValue::from(1i64),
                JsonValue::object(vec![("id", JsonValue::from(2i64))]),
            ]),
        )]);
        assert_eq!(
            serialize_json(&value, &Dialect::json()).unwrap(),
            "{\"items\": [1,\n{\"id\": 2}]}"
        );
        assert_eq!(
            serialize_json(&value, &Dialect::opl()).unwrap(),
            "{'items' = [1\n{'id' = 2}]}"
        );
        assert_eq!(serialize_json(&JsonValue::Array(vec![]), &Dialect::opl()).unwrap(), "[]");
    }

    #[test]
    fn test_json_dialect_output_is_valid_json() {
        let value = JsonValue::object(vec![
            ("quote", JsonValue::from("say \"hi\"\n")),
            (
                "nested",
                JsonValue::object(vec![(
                    "list",
                    JsonValue::Array(vec![JsonValue::from(-1.5), JsonValue::Null]),
                )]),
            ),
        ]);
        let dialect = Dialect::json().with_escaping(EscapeMode::Strict);
        let out = serialize_json(&value, &dialect).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["quote"], "say \"hi\"\n");
        assert_eq!(parsed["nested"]["list"][0], -1.5);
    }

    #[test]
    fn test_nested_non_finite_number_fails() {
        let value = JsonValue::object(vec![("x", JsonValue::from(f64::NAN))]);
        assert_eq!(
            serialize_json(&value, &Dialect::json()),
            Err(NotationError::encoding("NaN"))
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut value = JsonValue::from(1i64);
        for _ in 0..10 {
            value = JsonValue::Array(vec![value]);
        }
        let shallow = Dialect::json().with_max_depth(5);
        assert_eq!(
            serialize_json(&value, &shallow),
            Err(NotationError::DepthExceeded { limit: 5 })
        );
        let deep = Dialect::json().with_max_depth(10);
        assert!(serialize_json(&value, &deep).is_ok());
    }
}
