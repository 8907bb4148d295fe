//! Check agent files without printing definitions

use colored::*;
use eyre::Result;
use std::fs;
use std::path::Path;

use crate::compiler;
use crate::config::Config;
use crate::loader::AGENT_FILE_SUFFIX;

pub fn run(path: &Path, config: &Config) -> Result<()> {
    let defaults = config.compiler_defaults();

    let files: Vec<std::path::PathBuf> = if path.is_dir() {
        let mut files: Vec<_> = fs::read_dir(path)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .map(|n| n.to_string_lossy().ends_with(AGENT_FILE_SUFFIX))
                        .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        println!("{} No agent files found in {}", "(none)".dimmed(), path.display());
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        match compiler::compile_file(file, &defaults) {
            Ok(definition) => {
                println!("{} {} ({})", "✓".green(), file.display(), definition.name.bold());
            }
            Err(e) => {
                failed += 1;
                println!("{} {}: {:#}", "✗".red(), file.display(), e);
            }
        }
    }

    if failed > 0 {
        eyre::bail!("{} of {} agent files failed validation", failed, files.len());
    }

    Ok(())
}
