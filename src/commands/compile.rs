//! Compile a single agent file and print the definition

use colored::*;
use eyre::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::compiler::{self, AgentDefinition};
use crate::config::Config;

pub fn run(file: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let definition = compiler::compile_file(file, &config.compiler_defaults())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&definition)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&definition)?),
        OutputFormat::Text => print_definition(&definition),
    }

    Ok(())
}

fn print_definition(definition: &AgentDefinition) {
    println!("{} {}", "Agent:".bold(), definition.display_name.green().bold());
    println!();
    println!("{} {}", "Description:".bold(), definition.description);
    println!(
        "{} {} (temperature {}, top_p {}, thinking budget {})",
        "Model:".bold(),
        definition.model_config.model.cyan(),
        definition.model_config.temperature,
        definition.model_config.top_p,
        definition.model_config.thinking_budget
    );
    println!(
        "{} {} minutes, {} turns",
        "Limits:".bold(),
        definition.run_config.max_time_minutes,
        definition.run_config.max_turns
    );

    if let Some(ref tool_config) = definition.tool_config {
        println!("{} {}", "Tools:".bold(), tool_config.tools.join(", ").cyan());
    }

    println!();
    println!("{}", "Inputs:".bold());
    for (name, binding) in &definition.input_config.inputs {
        let requirement = if binding.required { "required" } else { "optional" };
        println!(
            "  {} {} ({}, {})",
            "•".cyan(),
            name.bold(),
            binding.kind,
            requirement.dimmed()
        );
        if !binding.description.is_empty() {
            println!("    {}", binding.description.dimmed());
        }
    }

    println!();
    println!(
        "{} {} {}",
        "Output:".bold(),
        definition.output_config.output_name,
        if definition.output_config.postprocess.is_some() {
            "(json)".dimmed()
        } else {
            "(text)".dimmed()
        }
    );

    println!();
    println!("{}", "System prompt:".bold());
    for line in definition.prompt_config.system_prompt.lines() {
        println!("  {}", line);
    }

    println!();
    println!("{}", "Query template:".bold());
    for line in definition.prompt_config.query.lines() {
        println!("  {}", line);
    }
}
