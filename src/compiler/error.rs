//! Per-document parse failures
//!
//! Only two conditions abort a parse: a missing agent name heading, and a
//! structured section whose fenced JSON block is missing or unparsable.
//! Everything else (bad input entries, malformed schemas) degrades in place.

use thiserror::Error;

/// Fatal, per-document parse errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document has no `# Agent: <name>` heading, or the name is empty
    #[error("document has no `# Agent: <name>` heading")]
    MissingAgentName,

    /// A structured section is present but its fenced JSON block is missing
    /// or does not parse
    #[error("section `{section}` is malformed: {reason}")]
    MalformedSection { section: String, reason: String },
}

impl ParseError {
    pub fn malformed(section: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSection {
            section: section.to_string(),
            reason: reason.into(),
        }
    }
}
