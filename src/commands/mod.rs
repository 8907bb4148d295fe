pub mod compile;
pub mod completions;
pub mod list;
pub mod prompt;
pub mod validate;
