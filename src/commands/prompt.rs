//! Print the synthesized system prompt for an agent file

use eyre::Result;
use std::path::Path;

use crate::compiler;
use crate::config::Config;

pub fn run(file: &Path, config: &Config) -> Result<()> {
    let definition = compiler::compile_file(file, &config.compiler_defaults())?;
    println!("{}", definition.prompt_config.system_prompt);
    Ok(())
}
