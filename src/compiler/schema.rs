//! Recursive JSON-Schema compilation
//!
//! Translates a JSON-Schema-like fragment into an executable validator
//! descriptor. The compiler is deliberately lenient: unknown, absent, or
//! malformed nodes degrade to [`CompiledSchema::Any`] instead of failing,
//! because schemas authored by an LLM must never crash a whole definition.
//! Object validators use passthrough semantics: properties beyond the
//! declared set are accepted.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Executable validator/type descriptor for an output schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompiledSchema {
    /// Accept-anything fallback for unknown or malformed nodes
    Any,
    String,
    Number,
    /// Number constrained to an integral value
    Integer,
    Boolean,
    /// Array over a compiled item descriptor
    Array(Box<CompiledSchema>),
    /// Declared object fields; extra properties pass through
    Object(Vec<ObjectField>),
}

/// One declared property of an object schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectField {
    pub name: String,
    pub required: bool,
    pub schema: CompiledSchema,
}

impl CompiledSchema {
    /// Compile a schema node. Never fails; anything unrecognized becomes
    /// [`CompiledSchema::Any`].
    pub fn compile(node: Option<&Value>) -> Self {
        let Some(node) = node.and_then(Value::as_object) else {
            return CompiledSchema::Any;
        };

        match node.get("type").and_then(Value::as_str) {
            Some("string") => CompiledSchema::String,
            Some("number") => CompiledSchema::Number,
            Some("integer") => CompiledSchema::Integer,
            Some("boolean") => CompiledSchema::Boolean,
            Some("array") => CompiledSchema::Array(Box::new(Self::compile(node.get("items")))),
            Some("object") => {
                let required: HashSet<&str> = node
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|names| names.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();

                let fields = node
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, child)| ObjectField {
                                name: name.clone(),
                                required: required.contains(name.as_str()),
                                schema: Self::compile(Some(child)),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                CompiledSchema::Object(fields)
            }
            _ => CompiledSchema::Any,
        }
    }

    /// Check a value against this descriptor, reporting the first violation
    /// with the path where it occurred.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), String> {
        match self {
            CompiledSchema::Any => Ok(()),
            CompiledSchema::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("{}: expected string, got {}", path, kind_of(value)))
                }
            }
            CompiledSchema::Number => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err(format!("{}: expected number, got {}", path, kind_of(value)))
                }
            }
            CompiledSchema::Integer => {
                let integral =
                    value.is_i64() || value.is_u64() || value.as_f64().map(|n| n.fract() == 0.0).unwrap_or(false);
                if integral {
                    Ok(())
                } else {
                    Err(format!("{}: expected integer, got {}", path, kind_of(value)))
                }
            }
            CompiledSchema::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("{}: expected boolean, got {}", path, kind_of(value)))
                }
            }
            CompiledSchema::Array(items) => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| format!("{}: expected array, got {}", path, kind_of(value)))?;
                for (i, element) in elements.iter().enumerate() {
                    items.validate_at(element, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            CompiledSchema::Object(fields) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| format!("{}: expected object, got {}", path, kind_of(value)))?;
                for field in fields {
                    match map.get(&field.name) {
                        Some(child) => field.schema.validate_at(child, &format!("{}.{}", path, field.name))?,
                        None if field.required => {
                            return Err(format!("{}: missing required property `{}`", path, field.name));
                        }
                        None => {}
                    }
                }
                // undeclared properties pass through
                Ok(())
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
