//! Per-section field parsers
//!
//! Each section of an agent markdown document has its own small grammar:
//! free text, a bullet list, or a single fenced JSON block. Parsers here
//! never trust the shape of external JSON; every field is extracted with an
//! explicit presence-and-type check and either kept, defaulted, or dropped.

use lazy_regex::regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::error::ParseError;

/// Allowed `type` values for a declared input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    String,
    Number,
    Boolean,
    Integer,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number[]")]
    NumberArray,
}

impl std::str::FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(InputType::String),
            "number" => Ok(InputType::Number),
            "boolean" => Ok(InputType::Boolean),
            "integer" => Ok(InputType::Integer),
            "string[]" => Ok(InputType::StringArray),
            "number[]" => Ok(InputType::NumberArray),
            _ => Err(format!("Unknown input type: {}", s)),
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputType::String => "string",
            InputType::Number => "number",
            InputType::Boolean => "boolean",
            InputType::Integer => "integer",
            InputType::StringArray => "string[]",
            InputType::NumberArray => "number[]",
        };
        write!(f, "{}", s)
    }
}

/// One declared input parameter
#[derive(Debug, Clone, Serialize)]
pub struct AgentInputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub required: bool,
    pub description: String,
}

/// Declared output contract
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutputSpec {
    pub name: String,
    pub json: bool,
    pub description: String,
    /// Raw JSON-Schema fragment, compiled later
    pub schema: Option<Value>,
}

impl Default for AgentOutputSpec {
    fn default() -> Self {
        Self {
            name: "result".to_string(),
            json: false,
            description: String::new(),
            schema: None,
        }
    }
}

/// Model overrides declared in the document
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentModelSpec {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub thinking_budget: Option<f64>,
}

/// Execution-limit overrides declared in the document
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentRunConfigSpec {
    pub max_time_minutes: Option<f64>,
    pub max_turns: Option<f64>,
}

/// Parse a free-text section: strip fenced code blocks, trim, empty → None.
pub fn parse_plain_text(body: Option<&str>) -> Option<String> {
    let fence_re = regex!(r"(?ms)^```.*?^```[ \t]*$");

    let body = body?;
    let stripped = fence_re.replace_all(body, "");
    let text = stripped.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

/// Parse the guidelines section.
///
/// Bullet lines (`-`, `*`, `+`) win when any exist; otherwise the non-empty
/// lines collapse into a single joined guideline.
pub fn parse_guidelines(body: Option<&str>) -> Option<Vec<String>> {
    let body = body?;
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let bullets: Vec<String> = lines
        .iter()
        .filter_map(|line| strip_bullet(line))
        .map(|rest| rest.to_string())
        .filter(|rest| !rest.is_empty())
        .collect();

    if !bullets.is_empty() {
        Some(bullets)
    } else if !lines.is_empty() {
        Some(vec![lines.join(" ")])
    } else {
        None
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('+'))?;
    Some(rest.trim())
}

/// Parse a structured section body into JSON.
///
/// An absent section is fine (`Ok(None)`); a present section must contain
/// exactly one fenced block labeled `json` whose content parses.
pub fn parse_json_section(section: &str, body: Option<&str>) -> Result<Option<Value>, ParseError> {
    let json_fence_re = regex!(r"(?msi)^```[ \t]*json[ \t]*\r?\n(.*?)^```[ \t]*$");

    let Some(body) = body else {
        return Ok(None);
    };

    let blocks: Vec<&str> = json_fence_re
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    match blocks.as_slice() {
        [] => Err(ParseError::malformed(section, "no fenced ```json block found")),
        [block] => serde_json::from_str(block)
            .map(Some)
            .map_err(|e| ParseError::malformed(section, format!("invalid JSON: {}", e))),
        more => Err(ParseError::malformed(
            section,
            format!("expected exactly one fenced ```json block, found {}", more.len()),
        )),
    }
}

/// Validate the parsed inputs array.
///
/// Entries missing a non-empty name or carrying an unknown type are dropped;
/// `required` defaults to true. An all-dropped result is `None` so the
/// single-objective default applies downstream.
pub fn parse_inputs(value: &Value) -> Option<Vec<AgentInputSpec>> {
    let entries = value.as_array()?;

    let inputs: Vec<AgentInputSpec> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let input_type: InputType = entry.get("type")?.as_str()?.parse().ok()?;
            let required = entry.get("required").and_then(Value::as_bool).unwrap_or(true);
            let description = entry
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string();

            Some(AgentInputSpec {
                name: name.to_string(),
                input_type,
                required,
                description,
            })
        })
        .collect();

    if inputs.is_empty() { None } else { Some(inputs) }
}

/// Validate the parsed output object. Every field has a default; the schema
/// fragment passes through untouched for later compilation.
pub fn parse_output(value: &Value) -> AgentOutputSpec {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("result")
        .to_string();

    let json = value
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    AgentOutputSpec {
        name,
        json,
        description,
        schema: value.get("schema").cloned(),
    }
}

/// Validate a tools/MCP identifier array.
///
/// String elements are trimmed; number and boolean elements are rendered as
/// their JSON text; nulls and composites are dropped. Duplicates are removed
/// keeping first-occurrence order. Empty result → None.
pub fn parse_string_list(value: &Value) -> Option<Vec<String>> {
    let entries = value.as_array()?;

    let mut seen = HashSet::new();
    let items: Vec<String> = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(_) | Value::Bool(_) => Some(entry.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect();

    if items.is_empty() { None } else { Some(items) }
}

/// Validate the parsed model object. Numeric fields pass through only when
/// they are actual JSON numbers.
pub fn parse_model(value: &Value) -> AgentModelSpec {
    AgentModelSpec {
        model: value
            .get("model")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        temperature: value.get("temperature").and_then(Value::as_f64),
        top_p: value.get("top_p").and_then(Value::as_f64),
        thinking_budget: value.get("thinkingBudget").and_then(Value::as_f64),
    }
}

/// Validate the parsed run-config object.
pub fn parse_run_config(value: &Value) -> AgentRunConfigSpec {
    AgentRunConfigSpec {
        max_time_minutes: value.get("max_time_minutes").and_then(Value::as_f64),
        max_turns: value.get("max_turns").and_then(Value::as_f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_text_trims() {
        assert_eq!(parse_plain_text(Some("  hello  ")).unwrap(), "hello");
    }

    #[test]
    fn test_parse_plain_text_strips_fences() {
        let body = "before\n```json\n{\"x\": 1}\n```\nafter";
        let text = parse_plain_text(Some(body)).unwrap();
        assert!(text.contains("before"));
        assert!(text.contains("after"));
        assert!(!text.contains("x"));
    }

    #[test]
    fn test_parse_plain_text_empty_after_stripping() {
        let body = "```\ncode only\n```";
        assert!(parse_plain_text(Some(body)).is_none());
        assert!(parse_plain_text(None).is_none());
        assert!(parse_plain_text(Some("   ")).is_none());
    }

    #[test]
    fn test_parse_guidelines_bullets() {
        let body = "- first rule\n* second rule\n+ third rule\n";
        let guidelines = parse_guidelines(Some(body)).unwrap();
        assert_eq!(guidelines, vec!["first rule", "second rule", "third rule"]);
    }

    #[test]
    fn test_parse_guidelines_bullets_win_over_prose() {
        let body = "Some intro prose\n- only this bullet\n";
        let guidelines = parse_guidelines(Some(body)).unwrap();
        assert_eq!(guidelines, vec!["only this bullet"]);
    }

    #[test]
    fn test_parse_guidelines_paragraph_fallback() {
        let body = "Be concise.\nCite sources.\n";
        let guidelines = parse_guidelines(Some(body)).unwrap();
        assert_eq!(guidelines, vec!["Be concise. Cite sources."]);
    }

    #[test]
    fn test_parse_guidelines_empty() {
        assert!(parse_guidelines(Some("   \n  \n")).is_none());
        assert!(parse_guidelines(None).is_none());
    }

    #[test]
    fn test_parse_json_section_absent_is_ok() {
        assert!(parse_json_section("inputs", None).unwrap().is_none());
    }

    #[test]
    fn test_parse_json_section_valid() {
        let body = "```json\n[{\"name\": \"x\"}]\n```";
        let value = parse_json_section("inputs", Some(body)).unwrap().unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_parse_json_section_label_case_insensitive() {
        let body = "```JSON\n{}\n```";
        assert!(parse_json_section("model", Some(body)).unwrap().is_some());
    }

    #[test]
    fn test_parse_json_section_missing_block() {
        let err = parse_json_section("tools", Some("just prose")).unwrap_err();
        assert!(err.to_string().contains("tools"));
    }

    #[test]
    fn test_parse_json_section_bad_json() {
        let body = "```json\n{not json}\n```";
        let err = parse_json_section("model", Some(body)).unwrap_err();
        assert!(err.to_string().contains("model"));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_parse_json_section_multiple_blocks() {
        let body = "```json\n{}\n```\n\n```json\n{}\n```";
        let err = parse_json_section("output", Some(body)).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn test_parse_inputs_valid() {
        let value = json!([
            {"name": "objective", "type": "string", "description": "goal"},
            {"name": "hints", "type": "string[]", "required": false}
        ]);
        let inputs = parse_inputs(&value).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].name, "objective");
        assert!(inputs[0].required);
        assert_eq!(inputs[1].input_type, InputType::StringArray);
        assert!(!inputs[1].required);
    }

    #[test]
    fn test_parse_inputs_drops_invalid_entries() {
        let value = json!([
            {"name": "", "type": "string"},
            {"name": "ok", "type": "number"},
            {"name": "bad", "type": "tuple"},
            {"type": "string"}
        ]);
        let inputs = parse_inputs(&value).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, "ok");
    }

    #[test]
    fn test_parse_inputs_all_dropped_is_none() {
        let value = json!([{"name": "bad", "type": "tuple"}]);
        assert!(parse_inputs(&value).is_none());
        assert!(parse_inputs(&json!({"not": "an array"})).is_none());
    }

    #[test]
    fn test_parse_output_defaults() {
        let output = parse_output(&json!({}));
        assert_eq!(output.name, "result");
        assert!(!output.json);
        assert_eq!(output.description, "");
        assert!(output.schema.is_none());
    }

    #[test]
    fn test_parse_output_json_type() {
        assert!(parse_output(&json!({"type": "json"})).json);
        assert!(parse_output(&json!({"type": "JSON"})).json);
        assert!(!parse_output(&json!({"type": "text"})).json);
        assert!(!parse_output(&json!({"type": "jsonish"})).json);
    }

    #[test]
    fn test_parse_output_schema_passthrough() {
        let output = parse_output(&json!({"type": "json", "schema": {"type": "object"}}));
        assert_eq!(output.schema.unwrap()["type"], "object");
    }

    #[test]
    fn test_parse_string_list_dedup_preserves_order() {
        let value = json!(["grep", " ls ", "grep", "glob"]);
        let tools = parse_string_list(&value).unwrap();
        assert_eq!(tools, vec!["grep", "ls", "glob"]);
    }

    #[test]
    fn test_parse_string_list_coerces_scalars() {
        let value = json!(["web_fetch", 42, true, null, {"x": 1}]);
        let tools = parse_string_list(&value).unwrap();
        assert_eq!(tools, vec!["web_fetch", "42", "true"]);
    }

    #[test]
    fn test_parse_string_list_empty_is_none() {
        assert!(parse_string_list(&json!([])).is_none());
        assert!(parse_string_list(&json!(["", "  "])).is_none());
    }

    #[test]
    fn test_parse_model_numeric_fields_only() {
        let spec = parse_model(&json!({
            "model": "gemini-2.5-pro-exp",
            "temperature": 0.1,
            "top_p": "0.8",
            "thinkingBudget": 180
        }));
        assert_eq!(spec.model.unwrap(), "gemini-2.5-pro-exp");
        assert_eq!(spec.temperature.unwrap(), 0.1);
        assert!(spec.top_p.is_none());
        assert_eq!(spec.thinking_budget.unwrap(), 180.0);
    }

    #[test]
    fn test_parse_model_empty_model_dropped() {
        let spec = parse_model(&json!({"model": "  "}));
        assert!(spec.model.is_none());
    }

    #[test]
    fn test_parse_run_config() {
        let spec = parse_run_config(&json!({"max_time_minutes": 7, "max_turns": "14"}));
        assert_eq!(spec.max_time_minutes.unwrap(), 7.0);
        assert!(spec.max_turns.is_none());
    }

    #[test]
    fn test_input_type_from_str() {
        assert_eq!("string".parse::<InputType>().unwrap(), InputType::String);
        assert_eq!("String[]".parse::<InputType>().unwrap(), InputType::StringArray);
        assert!("tuple".parse::<InputType>().is_err());
    }

    #[test]
    fn test_input_type_display() {
        assert_eq!(InputType::NumberArray.to_string(), "number[]");
        assert_eq!(InputType::Integer.to_string(), "integer");
    }
}
