//! Agent specification compiler
//!
//! Turns an agent markdown document into a validated [`AgentDefinition`].
//! The pipeline is pure: sections are extracted, each section runs its own
//! grammar, fields are normalized against declared defaults, and the output
//! schema is compiled into an executable descriptor. The only fatal
//! conditions are a missing agent name and a malformed structured section.

pub mod definition;
pub mod error;
pub mod fields;
pub mod schema;
pub mod sections;

use std::fs;
use std::path::Path;

use eyre::{Context, Result};

use definition::Defaults;
pub use definition::AgentDefinition;
pub use error::ParseError;
use fields::{AgentInputSpec, AgentModelSpec, AgentOutputSpec, AgentRunConfigSpec};

/// Loosely-typed extraction result, consumed immediately by the assembler
#[derive(Debug, Clone)]
pub struct ParsedAgentConfig {
    pub name: String,
    pub summary: Option<String>,
    pub persona: Option<String>,
    pub role: Option<String>,
    pub guidelines: Option<Vec<String>>,
    pub inputs: Option<Vec<AgentInputSpec>>,
    pub output: Option<AgentOutputSpec>,
    pub tools: Option<Vec<String>>,
    pub mcp_servers: Option<Vec<String>>,
    pub model: AgentModelSpec,
    pub run_config: AgentRunConfigSpec,
    pub query: Option<String>,
    pub system_prompt: Option<String>,
}

/// Parse a document into the intermediate config, without assembling.
pub fn parse_document(markdown: &str) -> Result<ParsedAgentConfig, ParseError> {
    let name = sections::resolve_agent_name(markdown)?;
    let raw = sections::extract_sections(markdown);
    let body = |key: &str| raw.get(key).map(String::as_str);

    let inputs = parse_structured(&raw, "inputs")?.as_ref().and_then(fields::parse_inputs);
    let output = parse_structured(&raw, "output")?.as_ref().map(fields::parse_output);
    let tools = parse_structured(&raw, "tools")?.as_ref().and_then(fields::parse_string_list);
    let mcp_servers = parse_structured(&raw, "mcp")?.as_ref().and_then(fields::parse_string_list);
    let model = parse_structured(&raw, "model")?
        .as_ref()
        .map(fields::parse_model)
        .unwrap_or_default();
    let run_config = parse_structured(&raw, "run config")?
        .as_ref()
        .map(fields::parse_run_config)
        .unwrap_or_default();

    Ok(ParsedAgentConfig {
        name,
        summary: fields::parse_plain_text(body("summary")),
        persona: fields::parse_plain_text(body("persona")),
        role: fields::parse_plain_text(body("role")),
        guidelines: fields::parse_guidelines(body("guidelines")),
        inputs,
        output,
        tools,
        mcp_servers,
        model,
        run_config,
        query: fields::parse_plain_text(body("query")),
        system_prompt: fields::parse_plain_text(body("system prompt")),
    })
}

fn parse_structured(raw: &sections::RawSections, section: &str) -> Result<Option<serde_json::Value>, ParseError> {
    fields::parse_json_section(section, raw.get(section).map(String::as_str))
}

/// Compile a document into its final definition.
///
/// `source` identifies the document for the generic description fallback
/// (usually the file name).
pub fn compile_str(markdown: &str, source: &str, defaults: &Defaults) -> Result<AgentDefinition, ParseError> {
    let parsed = parse_document(markdown)?;
    Ok(definition::assemble(parsed, source, defaults))
}

/// Compile an agent markdown file.
pub fn compile_file(path: &Path, defaults: &Defaults) -> Result<AgentDefinition> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read agent file: {}", path.display()))?;

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    compile_str(&content, &source, defaults)
        .with_context(|| format!("Failed to compile agent file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Defaults {
        Defaults {
            model: "gemini-2.5-flash".to_string(),
            thinking_budget: 1024.0,
        }
    }

    const CARTOGRAPHER: &str = r#"# Agent: Code Cartographer

## Summary
Maps unfamiliar codebases and reports their structure.

## Guidelines
- Start from the entry points
- Prefer breadth over depth

## Inputs
```json
[
  {"name": "objective", "type": "string", "description": "What to map"},
  {"name": "hints", "type": "string[]", "required": false, "description": "Places to look first"}
]
```

## Tools
```json
["read_file", "ls", "glob", "grep", "web_fetch"]
```

## Model
```json
{"model": "gemini-2.5-pro-exp", "temperature": 0.1, "top_p": 0.8, "thinkingBudget": 180}
```

## Run Config
```json
{"max_time_minutes": 7, "max_turns": 14}
```

## Query
Map the repository: ${objective}
"#;

    #[test]
    fn test_compile_sample_document() {
        let definition = compile_str(CARTOGRAPHER, "cartographer.agent.md", &defaults()).unwrap();

        assert_eq!(definition.name, "Code Cartographer");
        assert_eq!(definition.model_config.model, "gemini-2.5-pro-exp");
        assert_eq!(definition.model_config.temperature, 0.1);
        assert_eq!(definition.model_config.top_p, 0.8);
        assert_eq!(definition.model_config.thinking_budget, 180.0);
        assert_eq!(definition.run_config.max_time_minutes, 7.0);
        assert_eq!(definition.run_config.max_turns, 14.0);
        assert_eq!(
            definition.tool_config.unwrap().tools,
            vec!["read_file", "ls", "glob", "grep", "web_fetch"]
        );
        assert!(!definition.input_config.inputs.get("hints").unwrap().required);
        assert!(definition.input_config.inputs.get("objective").unwrap().required);
        assert_eq!(definition.prompt_config.query, "Map the repository: ${objective}");
    }

    #[test]
    fn test_compile_missing_name_fails() {
        let result = compile_str("## Summary\nno header\n", "x", &defaults());
        assert!(matches!(result, Err(ParseError::MissingAgentName)));
    }

    #[test]
    fn test_compile_malformed_section_names_section() {
        let doc = "# Agent: Broken\n\n## Model\n```json\n{oops\n```\n";
        let err = compile_str(doc, "x", &defaults()).unwrap_err();
        match err {
            ParseError::MalformedSection { section, .. } => assert_eq!(section, "model"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_compile_structured_section_without_fence_fails() {
        let doc = "# Agent: Broken\n\n## Inputs\njust words, no json block\n";
        let err = compile_str(doc, "x", &defaults()).unwrap_err();
        assert!(err.to_string().contains("inputs"));
    }

    #[test]
    fn test_compile_no_inputs_defaults_to_objective() {
        let definition = compile_str("# Agent: Bare\n", "bare.agent.md", &defaults()).unwrap();

        assert_eq!(definition.input_config.inputs.len(), 1);
        assert!(definition.input_config.inputs.contains_key("objective"));
    }

    #[test]
    fn test_compile_all_invalid_inputs_defaults_to_objective() {
        let doc = "# Agent: Bare\n\n## Inputs\n```json\n[{\"name\": \"x\", \"type\": \"tuple\"}]\n```\n";
        let definition = compile_str(doc, "x", &defaults()).unwrap();

        assert_eq!(definition.input_config.inputs.len(), 1);
        let binding = definition.input_config.inputs.get("objective").unwrap();
        assert!(binding.required);
    }

    #[test]
    fn test_compile_json_output_schema() {
        let doc = concat!(
            "# Agent: Structured\n\n## Output\n```json\n",
            r#"{"type": "json", "schema": {"type": "object", "properties": {"a": {"type": "string"}}, "required": ["a"]}}"#,
            "\n```\n"
        );
        let definition = compile_str(doc, "x", &defaults()).unwrap();
        let schema = &definition.output_config.schema;

        assert!(schema.validate(&json!({"a": "x"})).is_ok());
        assert!(schema.validate(&json!({"a": "x", "b": 1})).is_ok());
        assert!(schema.validate(&json!({})).is_err());
        assert!(definition.output_config.postprocess.is_some());
    }

    #[test]
    fn test_compile_system_prompt_synthesis() {
        let doc = "# Agent: Trip Planner\n\n## Role\na travel planner\n\n## Guidelines\n- book early\n- avoid layovers\n";
        let definition = compile_str(doc, "x", &defaults()).unwrap();
        let prompt = &definition.prompt_config.system_prompt;

        assert!(prompt.contains("Trip Planner"));
        assert!(prompt.contains("a travel planner"));
        let first = prompt.find("book early").unwrap();
        let second = prompt.find("avoid layovers").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_compile_query_strips_embedded_fences() {
        let doc = "# Agent: Q\n\n## Query\nAnswer about ${objective}\n```\nignored\n```\n";
        let definition = compile_str(doc, "x", &defaults()).unwrap();
        assert_eq!(definition.prompt_config.query, "Answer about ${objective}");
    }
}
