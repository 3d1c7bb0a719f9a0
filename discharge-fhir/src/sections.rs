//! Composition section list.

use discharge_core::{SectionKind, SectionTexts};

use crate::model::{Reference, Section, SectionContent};
use crate::narrative::Narrative;
use crate::vocab::section_concept;

/// Placeholder narrative for an empty, unlinked section.
pub const NO_DATA: &str = "No data";

/// Records produced by the builders that sections may point at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionLinks {
    pub medications: Vec<Reference>,
    pub care_plan: Option<Reference>,
    pub documents: Vec<Reference>,
}

impl SectionLinks {
    /// Links for `kind`; always empty for narrative-only sections.
    pub fn for_section(&self, kind: SectionKind) -> Vec<Reference> {
        match kind {
            SectionKind::Medications => self.medications.clone(),
            SectionKind::CarePlan => self.care_plan.iter().cloned().collect(),
            SectionKind::DocumentReference => self.documents.clone(),
            _ => Vec::new(),
        }
    }
}

/// All ten sections in fixed order.
pub fn compose_sections(texts: &SectionTexts, links: &SectionLinks, language: &str) -> Vec<Section> {
    SectionKind::ALL
        .into_iter()
        .map(|kind| compose_section(kind, texts.get(kind), links.for_section(kind), language))
        .collect()
}

pub fn compose_section(
    kind: SectionKind,
    text: &str,
    links: Vec<Reference>,
    language: &str,
) -> Section {
    let content = if links.is_empty() || !kind.accepts_entries() {
        let body = if text.trim().is_empty() { NO_DATA } else { text };
        SectionContent::Narrative {
            text: Narrative::generated(language, body),
        }
    } else {
        SectionContent::Entries { entry: links }
    };

    Section {
        title: kind.title().to_string(),
        code: section_concept(kind).codeable(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Token;
    use uuid::Uuid;

    fn reference(n: u128) -> Reference {
        Reference::to("MedicationRequest", &Token::from(Uuid::from_u128(n)))
    }

    #[test]
    fn narrative_only_sections_ignore_links() {
        let section = compose_section(SectionKind::Allergies, "Penicillin", vec![reference(1)], "en-IN");
        assert!(matches!(section.content, SectionContent::Narrative { .. }));
    }

    #[test]
    fn linked_section_carries_no_text() {
        let section = compose_section(SectionKind::Medications, "ignored", vec![reference(1)], "en-IN");
        assert_eq!(
            section.content,
            SectionContent::Entries {
                entry: vec![reference(1)]
            }
        );
    }

    #[test]
    fn empty_unlinked_section_uses_placeholder() {
        let section = compose_section(SectionKind::CarePlan, "   ", Vec::new(), "en-IN");
        let SectionContent::Narrative { text } = section.content else {
            panic!("expected narrative");
        };
        assert!(text.div.contains(">No data</p>"));
    }
}
