//! Context Formatter - renders ranked sections as the model's context block

use crate::section_store::SectionRecord;

/// Returned instead of an empty block so the prompt never carries a blank context
pub const NO_SECTIONS_FOUND: &str = "No relevant BNS sections found.";

const NOT_APPLICABLE: &str = "N/A";

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_APPLICABLE
    } else {
        value
    }
}

/// Format sections, in the given order, for the language model
pub fn format_sections_for_context(sections: &[&SectionRecord]) -> String {
    if sections.is_empty() {
        return NO_SECTIONS_FOUND.to_string();
    }

    let mut context = String::with_capacity(256 * sections.len());
    context.push_str("### RELEVANT BNS SECTIONS:\n\n");

    for section in sections {
        context.push_str(&format!("**Section {}: {}**\n", section.id, section.title));
        context.push_str(&format!("Act: {}\n", section.act));
        context.push_str(&format!("Category: {}\n", or_na(&section.category)));
        context.push_str(&format!("Description: {}\n", or_na(&section.description)));
        context.push_str(&format!(
            "Punishment: {}\n",
            or_na(section.punishment.as_deref().unwrap_or(""))
        ));
        context.push_str("---\n\n");
    }

    context
}
