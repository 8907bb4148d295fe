//! Batch-load a directory of agent files

use colored::*;
use eyre::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::loader::{self, LoadWarning};

pub fn run(dir: Option<PathBuf>, format: OutputFormat, config: &Config) -> Result<()> {
    let dir = dir.unwrap_or_else(|| Config::expand_path(&config.agents_dir));
    let result = loader::load_agents_dir(&dir, &config.compiler_defaults());

    #[derive(Serialize)]
    struct AgentSummary {
        name: String,
        description: String,
        model: String,
        tools: Vec<String>,
    }

    #[derive(Serialize)]
    struct Listing {
        agents: Vec<AgentSummary>,
        warnings: Vec<LoadWarning>,
    }

    let listing = Listing {
        agents: result
            .agents
            .iter()
            .map(|a| AgentSummary {
                name: a.name.clone(),
                description: a.description.clone(),
                model: a.model_config.model.clone(),
                tools: a.tool_config.as_ref().map(|t| t.tools.clone()).unwrap_or_default(),
            })
            .collect(),
        warnings: result.warnings.clone(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&listing)?),
        OutputFormat::Text => {
            println!("{}", "Available Agents:".bold());
            println!();

            if listing.agents.is_empty() {
                println!("  {} No agent files found in {}", "(none)".dimmed(), dir.display());
            } else {
                for agent in &listing.agents {
                    println!("  {} {}", "●".green(), agent.name.bold());
                    println!("    {}", agent.description.dimmed());
                    println!("    Model: {}", agent.model.cyan());
                    if !agent.tools.is_empty() {
                        println!("    Tools: {}", agent.tools.join(", ").cyan());
                    }
                    println!();
                }
            }

            if !listing.warnings.is_empty() {
                println!("{}", "Warnings:".yellow().bold());
                for warning in &listing.warnings {
                    println!("  {} {}: {}", "⚠".yellow(), warning.file, warning.reason.dimmed());
                }
            }
        }
    }

    Ok(())
}
