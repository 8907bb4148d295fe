//! Definition assembly and defaulting
//!
//! Reconciles a parsed document with process-wide defaults, synthesizes the
//! system prompt when none was declared, and produces the final
//! [`AgentDefinition`] consumed by an execution engine. The definition is
//! immutable once produced; all leniency happens before this point.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::ParsedAgentConfig;
use super::fields::InputType;
use super::schema::CompiledSchema;

pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_MAX_TIME_MINUTES: f64 = 5.0;
pub const DEFAULT_MAX_TURNS: f64 = 10.0;

const CLOSING_INSTRUCTION: &str =
    "Work through the task step by step, justify your reasoning, and make your final answer actionable.";

/// Process-wide defaults supplied by the configuration layer
#[derive(Debug, Clone)]
pub struct Defaults {
    pub model: String,
    pub thinking_budget: f64,
}

/// The compiled, executable agent contract
#[derive(Debug, Clone, Serialize)]
pub struct AgentDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub prompt_config: PromptConfig,
    pub model_config: ModelConfig,
    pub run_config: RunConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    pub output_config: OutputConfig,
    pub input_config: InputConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptConfig {
    pub system_prompt: String,
    /// Template string; `${name}` placeholders are resolved by the caller
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub thinking_budget: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub max_time_minutes: f64,
    pub max_turns: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolConfig {
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputConfig {
    pub output_name: String,
    pub description: String,
    pub schema: CompiledSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<OutputPostprocess>,
}

/// Post-processing applied to a structured result before display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPostprocess {
    /// Serialize the structured result back to pretty-printed JSON text
    PrettyJson,
}

impl OutputPostprocess {
    pub fn apply(&self, value: &Value) -> String {
        match self {
            OutputPostprocess::PrettyJson => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputConfig {
    /// Parameter name → binding, in declaration order
    pub inputs: IndexMap<String, InputBinding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputBinding {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub required: bool,
}

/// Canonical input kinds exposed to the execution engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputKind {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number[]")]
    NumberArray,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputKind::String => "string",
            InputKind::Number => "number",
            InputKind::Boolean => "boolean",
            InputKind::StringArray => "string[]",
            InputKind::NumberArray => "number[]",
        };
        write!(f, "{}", s)
    }
}

impl From<InputType> for InputKind {
    fn from(input_type: InputType) -> Self {
        match input_type {
            InputType::String => InputKind::String,
            InputType::Number | InputType::Integer => InputKind::Number,
            InputType::Boolean => InputKind::Boolean,
            InputType::StringArray => InputKind::StringArray,
            InputType::NumberArray => InputKind::NumberArray,
        }
    }
}

/// Assemble the final definition from a parsed document.
///
/// `source` identifies the originating document (usually the file name) and
/// only feeds the generic description fallback.
pub fn assemble(parsed: ParsedAgentConfig, source: &str, defaults: &Defaults) -> AgentDefinition {
    let system_prompt = build_system_prompt(&parsed);

    let description = parsed
        .summary
        .clone()
        .or_else(|| parsed.role.clone())
        .unwrap_or_else(|| format!("custom agent defined in `{}`", source));

    let model_config = ModelConfig {
        model: parsed.model.model.clone().unwrap_or_else(|| defaults.model.clone()),
        temperature: parsed.model.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        top_p: parsed.model.top_p.unwrap_or(DEFAULT_TOP_P),
        thinking_budget: parsed.model.thinking_budget.unwrap_or(defaults.thinking_budget),
    };

    let run_config = RunConfig {
        max_time_minutes: positive_or(parsed.run_config.max_time_minutes, DEFAULT_MAX_TIME_MINUTES),
        max_turns: positive_or(parsed.run_config.max_turns, DEFAULT_MAX_TURNS),
    };

    let inputs = parsed.inputs.clone().unwrap_or_else(default_inputs);

    let input_map: IndexMap<String, InputBinding> = inputs
        .iter()
        .map(|input| {
            (
                input.name.clone(),
                InputBinding {
                    description: input.description.clone(),
                    kind: InputKind::from(input.input_type),
                    required: input.required,
                },
            )
        })
        .collect();

    let query = parsed.query.clone().unwrap_or_else(|| synthesize_query(&input_map));

    let output = parsed.output.clone().unwrap_or_default();
    let output_config = OutputConfig {
        output_name: output.name,
        description: output.description,
        schema: CompiledSchema::compile(output.schema.as_ref()),
        postprocess: output.json.then_some(OutputPostprocess::PrettyJson),
    };

    AgentDefinition {
        display_name: parsed.name.clone(),
        description,
        prompt_config: PromptConfig { system_prompt, query },
        model_config,
        run_config,
        tool_config: parsed.tools.clone().map(|tools| ToolConfig { tools }),
        output_config,
        input_config: InputConfig { inputs: input_map },
        name: parsed.name,
    }
}

/// Keep a declared limit only when it is a finite number strictly above zero.
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(n) if n.is_finite() && n > 0.0 => n,
        _ => default,
    }
}

fn default_inputs() -> Vec<super::fields::AgentInputSpec> {
    vec![super::fields::AgentInputSpec {
        name: "objective".to_string(),
        input_type: InputType::String,
        required: true,
        description: "What the agent should accomplish".to_string(),
    }]
}

/// Build the system prompt: explicit override wins, otherwise compose from
/// role/persona/guidelines. Tool and MCP notices are appended either way.
fn build_system_prompt(parsed: &ParsedAgentConfig) -> String {
    let mut prompt = match &parsed.system_prompt {
        Some(explicit) => explicit.trim().to_string(),
        None => synthesize_system_prompt(parsed),
    };

    if let Some(tools) = &parsed.tools {
        prompt.push_str(&format!("\n\nYou can invoke the following tools: {}.", tools.join(", ")));
    }

    if let Some(servers) = &parsed.mcp_servers {
        prompt.push_str(&format!(
            "\n\nThe following MCP servers are available to you: {}. Use them when they help you complete the task.",
            servers.join(", ")
        ));
    }

    prompt
}

fn synthesize_system_prompt(parsed: &ParsedAgentConfig) -> String {
    let mut parts = Vec::new();

    let descriptor = parsed
        .role
        .as_deref()
        .or(parsed.summary.as_deref())
        .unwrap_or("a specialized assistant")
        .trim_end_matches('.');
    parts.push(format!("You are {}, {}.", parsed.name, descriptor));

    if let Some(persona) = &parsed.persona {
        parts.push(persona.clone());
    }

    if let Some(guidelines) = &parsed.guidelines {
        let bullets: Vec<String> = guidelines.iter().map(|g| format!("- {}", g)).collect();
        parts.push(format!("Follow these guidelines:\n{}", bullets.join("\n")));
    }

    parts.push(CLOSING_INSTRUCTION.to_string());
    parts.join("\n\n")
}

/// Default query template when the document declares none: one placeholder
/// per input so the caller can always resolve it.
fn synthesize_query(inputs: &IndexMap<String, InputBinding>) -> String {
    let mut names = inputs.keys();
    match (names.next(), names.next()) {
        (Some(only), None) => format!("${{{}}}", only),
        _ => inputs
            .keys()
            .map(|name| format!("{}: ${{{}}}", name, name))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
