//! Markdown section extraction
//!
//! Splits an agent markdown document into its second-level sections and
//! resolves the mandatory `# Agent: <name>` heading. Sections are keyed by
//! lower-cased heading title; a repeated heading overwrites the earlier
//! capture (last wins). The agent name heading is the only part of the
//! document whose absence is fatal.

use lazy_regex::regex;
use std::collections::HashMap;

use super::error::ParseError;

/// Lower-cased heading title → trimmed verbatim body
pub type RawSections = HashMap<String, String>;

/// Split a document into its `## <Title>` sections.
///
/// Each body runs from the end of its heading line to the start of the next
/// second-level heading (or end of document), trimmed. Section order in the
/// source is irrelevant to the result.
pub fn extract_sections(markdown: &str) -> RawSections {
    let heading_re = regex!(r"(?m)^##[ \t]+(.+?)[ \t]*$");

    let headings: Vec<(usize, usize, String)> = heading_re
        .captures_iter(markdown)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            Some((whole.start(), whole.end(), title.trim().to_lowercase()))
        })
        .collect();

    let mut sections = RawSections::new();
    for (i, (_, body_start, title)) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map(|next| next.0).unwrap_or(markdown.len());
        let body = markdown[*body_start..body_end].trim().to_string();
        // last occurrence of a duplicate heading wins
        sections.insert(title.clone(), body);
    }

    sections
}

/// Resolve the mandatory agent name from a `# Agent: <name>` heading.
///
/// The literal word "agent" is matched case-insensitively; when the document
/// contains several such headings the first one wins.
pub fn resolve_agent_name(markdown: &str) -> Result<String, ParseError> {
    let name_re = regex!(r"(?mi)^#[ \t]+agent[ \t]*:[ \t]*(.*?)[ \t]*$");

    let name = name_re
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .ok_or(ParseError::MissingAgentName)?;

    if name.is_empty() {
        return Err(ParseError::MissingAgentName);
    }

    Ok(name)
}
