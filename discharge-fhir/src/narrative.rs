//! Human-readable XHTML narrative attached to each resource.

use quick_xml::escape::escape;
use serde::Serialize;

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// FHIR `Narrative` with status `generated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub status: &'static str,
    pub div: String,
}

impl Narrative {
    pub fn generated(language: &str, text: &str) -> Self {
        Self {
            status: "generated",
            div: wrap_xhtml(language, text),
        }
    }
}

/// Wrap escaped text in the fixed `div`/`p` envelope, both tagged with the locale.
pub fn wrap_xhtml(language: &str, text: &str) -> String {
    format!(
        r#"<div xmlns="{XHTML_NAMESPACE}" lang="{language}" xml:lang="{language}"><p lang="{language}" xml:lang="{language}">{}</p></div>"#,
        render_lines(text)
    )
}

fn render_lines(text: &str) -> String {
    text.trim()
        .lines()
        .map(|line| escape(line).into_owned())
        .collect::<Vec<_>>()
        .join("<br/>")
}
