//! System-message composition for outbound model calls.
//!
//! The system message has up to two parts: the user's saved custom
//! instructions and the retrieval context block built from the top-ranked
//! chunks. Either part may be absent; when both are, no system message is
//! sent and the request proceeds as a plain query.

/// Build the retrieval context section from formatted search results.
/// Returns `None` when there is nothing to attach.
pub fn context_section(results: &[String]) -> Option<String> {
    if results.is_empty() {
        return None;
    }
    Some(format!(
        "Relevant information from uploaded files:\n{}\n\nPlease use this information to help answer the user's question when relevant.",
        results.join("\n\n")
    ))
}

/// Compose the full system message from custom instructions and retrieval
/// results. Returns `None` when there is nothing to send.
pub fn compose_system_message(
    custom_instructions: Option<&str>,
    results: &[String],
) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(instructions) = custom_instructions {
        if !instructions.trim().is_empty() {
            parts.push(format!(
                "{}\n\nPlease use the above instructions as context when responding to the user.",
                instructions
            ));
        }
    }

    if let Some(section) = context_section(results) {
        parts.push(section);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}
