//! Declarative value schemas for structured generation.
//!
//! A [`ValueSchema`] describes the JSON object a model is expected to
//! return: which fields are required, string length bounds, enum choices,
//! and array cardinality. [`ValueSchema::validate`] produces a
//! human-readable reason on failure, which drives the retry decision in the
//! structured client. [`ValueSchema::describe`] renders the expected shape
//! as prompt text.
//!
//! Validation enforces shape, not content: a response naming ingredients
//! outside the caller's list still validates if the structure conforms.

use serde_json::Value;

/// Schema for a JSON object with required, constrained fields.
#[derive(Debug, Clone)]
pub struct ValueSchema {
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone)]
struct FieldSpec {
    name: String,
    kind: FieldKind,
}

/// Constraint kind for a single schema field. All fields are required.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// String with a minimum and optional maximum character count.
    String {
        min_len: usize,
        max_len: Option<usize>,
    },
    /// String restricted to one of the given values.
    Enum(Vec<String>),
    /// Array of objects, each conforming to `item`, with cardinality
    /// bounds (minimum required, maximum optional).
    Array {
        min_items: usize,
        max_items: Option<usize>,
        item: ValueSchema,
    },
}

impl ValueSchema {
    /// Create an empty object schema.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Require a string field with length bounds (inclusive, in chars).
    pub fn string(mut self, name: impl Into<String>, min_len: usize, max_len: usize) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: FieldKind::String {
                min_len,
                max_len: Some(max_len),
            },
        });
        self
    }

    /// Require a non-empty string field with no upper length bound.
    pub fn text(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: FieldKind::String {
                min_len: 1,
                max_len: None,
            },
        });
        self
    }

    /// Require a string field restricted to the given values.
    pub fn enumeration(mut self, name: impl Into<String>, choices: &[&str]) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: FieldKind::Enum(choices.iter().map(|c| c.to_string()).collect()),
        });
        self
    }

    /// Require an array field of at least `min_items` objects, each
    /// conforming to `item`.
    pub fn array(mut self, name: impl Into<String>, min_items: usize, item: ValueSchema) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: FieldKind::Array {
                min_items,
                max_items: None,
                item,
            },
        });
        self
    }

    /// Require an array field with both cardinality bounds (inclusive).
    pub fn bounded_array(
        mut self,
        name: impl Into<String>,
        min_items: usize,
        max_items: usize,
        item: ValueSchema,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: FieldKind::Array {
                min_items,
                max_items: Some(max_items),
                item,
            },
        });
        self
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check a parsed value against this schema.
    ///
    /// Returns `Err(reason)` on the first violation. The reason is written
    /// for logs and retry accounting, never shown to end users. Unknown
    /// extra fields are tolerated.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", type_name(value)))?;

        for field in &self.fields {
            let v = match obj.get(&field.name) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required field '{}'", field.name))
                }
                Some(v) => v,
            };

            match &field.kind {
                FieldKind::String { min_len, max_len } => {
                    let s = v.as_str().ok_or_else(|| {
                        format!("field '{}' must be a string", field.name)
                    })?;
                    let chars = s.chars().count();
                    if chars < *min_len {
                        return Err(format!(
                            "field '{}' is too short ({} chars, min {})",
                            field.name, chars, min_len
                        ));
                    }
                    if let Some(max) = max_len {
                        if chars > *max {
                            return Err(format!(
                                "field '{}' is too long ({} chars, max {})",
                                field.name, chars, max
                            ));
                        }
                    }
                }
                FieldKind::Enum(choices) => {
                    let s = v.as_str().ok_or_else(|| {
                        format!("field '{}' must be a string", field.name)
                    })?;
                    if !choices.iter().any(|c| c == s) {
                        return Err(format!(
                            "field '{}' must be one of [{}], got '{}'",
                            field.name,
                            choices.join(", "),
                            s
                        ));
                    }
                }
                FieldKind::Array {
                    min_items,
                    max_items,
                    item,
                } => {
                    let arr = v.as_array().ok_or_else(|| {
                        format!("field '{}' must be an array", field.name)
                    })?;
                    if arr.len() < *min_items {
                        return Err(format!(
                            "field '{}' needs at least {} items, got {}",
                            field.name,
                            min_items,
                            arr.len()
                        ));
                    }
                    if let Some(max) = max_items {
                        if arr.len() > *max {
                            return Err(format!(
                                "field '{}' allows at most {} items, got {}",
                                field.name,
                                max,
                                arr.len()
                            ));
                        }
                    }
                    for (i, element) in arr.iter().enumerate() {
                        item.validate(element).map_err(|reason| {
                            format!("field '{}' item {}: {}", field.name, i, reason)
                        })?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the expected shape as prompt text.
    ///
    /// Produces a JSON skeleton with constraint hints as placeholder values,
    /// followed by one line per array cardinality bound.
    pub fn describe(&self) -> String {
        let mut out = serde_json::to_string_pretty(&self.shape())
            .unwrap_or_else(|_| "{}".to_string());
        for line in self.cardinality_notes("") {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }

    fn shape(&self) -> Value {
        let mut obj = serde_json::Map::new();
        for field in &self.fields {
            let hint = match &field.kind {
                FieldKind::String { min_len, max_len } => match max_len {
                    Some(max) => Value::String(format!("string ({}-{} chars)", min_len, max)),
                    None => Value::String(format!("string (min {} chars)", min_len)),
                },
                FieldKind::Enum(choices) => {
                    Value::String(format!("one of: {}", choices.join(" | ")))
                }
                FieldKind::Array { item, .. } => Value::Array(vec![item.shape()]),
            };
            obj.insert(field.name.clone(), hint);
        }
        Value::Object(obj)
    }

    fn cardinality_notes(&self, prefix: &str) -> Vec<String> {
        let mut notes = Vec::new();
        for field in &self.fields {
            if let FieldKind::Array {
                min_items,
                max_items,
                item,
            } = &field.kind
            {
                let path = if prefix.is_empty() {
                    field.name.clone()
                } else {
                    format!("{}.{}", prefix, field.name)
                };
                notes.push(match max_items {
                    Some(max) => format!(
                        "- \"{}\" must contain between {} and {} items",
                        path, min_items, max
                    ),
                    None => format!("- \"{}\" must contain at least {} item(s)", path, min_items),
                });
                notes.extend(item.cardinality_notes(&path));
            }
        }
        notes
    }
}

impl Default for ValueSchema {
    fn default() -> Self {
        Self::new()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn title_schema() -> ValueSchema {
        ValueSchema::new().string("title", 1, 50)
    }

    #[test]
    fn test_validate_ok() {
        let schema = title_schema();
        assert!(schema.validate(&json!({"title": "Simple Pancakes"})).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let schema = title_schema();
        let err = schema.validate(&json!("just a string")).unwrap_err();
        assert!(err.contains("expected a JSON object"));
    }

    #[test]
    fn test_validate_missing_field() {
        let schema = title_schema();
        let err = schema.validate(&json!({"name": "x"})).unwrap_err();
        assert!(err.contains("missing required field 'title'"));
    }

    #[test]
    fn test_validate_null_counts_as_missing() {
        let schema = title_schema();
        assert!(schema.validate(&json!({"title": null})).is_err());
    }

    #[test]
    fn test_validate_string_too_long() {
        let schema = title_schema();
        let long = "x".repeat(51);
        let err = schema.validate(&json!({ "title": long })).unwrap_err();
        assert!(err.contains("too long"));
    }

    #[test]
    fn test_validate_string_too_short() {
        let schema = title_schema();
        let err = schema.validate(&json!({"title": ""})).unwrap_err();
        assert!(err.contains("too short"));
    }

    #[test]
    fn test_validate_enum() {
        let schema = ValueSchema::new().enumeration("difficulty", &["easy", "medium", "hard"]);
        assert!(schema.validate(&json!({"difficulty": "easy"})).is_ok());
        let err = schema
            .validate(&json!({"difficulty": "impossible"}))
            .unwrap_err();
        assert!(err.contains("must be one of"));
    }

    #[test]
    fn test_validate_array_cardinality() {
        let schema = ValueSchema::new().array("steps", 1, ValueSchema::new().text("stepText"));
        let err = schema.validate(&json!({"steps": []})).unwrap_err();
        assert!(err.contains("at least 1"));
        assert!(schema
            .validate(&json!({"steps": [{"stepText": "mix"}]}))
            .is_ok());
    }

    #[test]
    fn test_validate_array_max_bound() {
        let schema =
            ValueSchema::new().bounded_array("steps", 1, 2, ValueSchema::new().text("stepText"));
        assert!(schema
            .validate(&json!({"steps": [{"stepText": "mix"}]}))
            .is_ok());
        let err = schema
            .validate(&json!({"steps": [
                {"stepText": "mix"}, {"stepText": "stir"}, {"stepText": "shake"}
            ]}))
            .unwrap_err();
        assert!(err.contains("at most 2"));
    }

    #[test]
    fn test_describe_mentions_both_array_bounds() {
        let schema =
            ValueSchema::new().bounded_array("steps", 1, 8, ValueSchema::new().text("stepText"));
        assert!(schema.describe().contains("between 1 and 8 items"));
    }

    #[test]
    fn test_validate_nested_item_failure_names_path() {
        let schema = ValueSchema::new().array("steps", 1, ValueSchema::new().text("stepText"));
        let err = schema
            .validate(&json!({"steps": [{"stepText": "mix"}, {"other": 1}]}))
            .unwrap_err();
        assert!(err.contains("item 1"));
        assert!(err.contains("stepText"));
    }

    #[test]
    fn test_extra_fields_tolerated() {
        let schema = title_schema();
        assert!(schema
            .validate(&json!({"title": "Ok", "surprise": 42}))
            .is_ok());
    }

    #[test]
    fn test_describe_mentions_constraints() {
        let schema = ValueSchema::new()
            .string("title", 1, 50)
            .enumeration("difficulty", &["easy", "medium", "hard"])
            .array("steps", 1, ValueSchema::new().text("stepText"));
        let desc = schema.describe();
        assert!(desc.contains("1-50 chars"));
        assert!(desc.contains("easy | medium | hard"));
        assert!(desc.contains("at least 1 item"));
    }
}
