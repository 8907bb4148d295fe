//! Batch loading of agent specification directories
//!
//! Scans a directory for `*.agent.md` files and compiles each one
//! independently. A failing file never aborts the batch: it becomes a
//! warning and the rest of the directory still loads. A missing directory
//! yields an empty result.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::compiler::definition::Defaults;
use crate::compiler::{self, AgentDefinition};

/// Only files with this suffix are treated as agent specifications
pub const AGENT_FILE_SUFFIX: &str = ".agent.md";

/// One file that failed to compile during a batch load
#[derive(Debug, Clone, Serialize)]
pub struct LoadWarning {
    pub file: String,
    pub reason: String,
}

/// Outcome of a batch load: the successfully compiled subset plus warnings
#[derive(Debug, Default)]
pub struct LoadResult {
    pub agents: Vec<AgentDefinition>,
    pub warnings: Vec<LoadWarning>,
}

enum FileOutcome {
    Parsed(AgentDefinition),
    Skipped(LoadWarning),
}

/// Load every agent specification in a directory.
///
/// Non-agent files are ignored. Per-file failures are logged and collected
/// as warnings; directory-level failures degrade to an empty result.
pub fn load_agents_dir(dir: &Path, defaults: &Defaults) -> LoadResult {
    let mut result = LoadResult::default();

    if !dir.exists() {
        log::debug!("Agents directory does not exist: {}", dir.display());
        return result;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Failed to read agents directory {}: {}", dir.display(), e);
            return result;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !is_agent_file(&path) {
            continue;
        }

        match load_agent_file(&path, defaults) {
            FileOutcome::Parsed(agent) => result.agents.push(agent),
            FileOutcome::Skipped(warning) => {
                log::warn!("Skipping {}: {}", warning.file, warning.reason);
                result.warnings.push(warning);
            }
        }
    }

    // Sort by name for consistent ordering
    result.agents.sort_by(|a, b| a.name.cmp(&b.name));

    result
}

fn is_agent_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .map(|n| n.to_string_lossy().ends_with(AGENT_FILE_SUFFIX))
            .unwrap_or(false)
}

fn load_agent_file(path: &Path, defaults: &Defaults) -> FileOutcome {
    match compiler::compile_file(path, defaults) {
        Ok(agent) => FileOutcome::Parsed(agent),
        Err(e) => FileOutcome::Skipped(LoadWarning {
            file: path.display().to_string(),
            reason: format!("{:#}", e),
        }),
    }
}
