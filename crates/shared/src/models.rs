use serde::{Deserialize, Serialize};

/// Rendered in place of a paper title the source document did not provide
pub const UNKNOWN_TITLE: &str = "unknown title";

/// Rendered in place of a section heading the source document did not provide
pub const UNKNOWN_SECTION: &str = "unknown section";

/// One titled unit of a paper's body text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    title: Option<String>,
    text: String,
}

impl Section {
    pub fn new(title: Option<String>, text: impl Into<String>) -> Self {
        Self {
            title: non_blank(title),
            text: text.into(),
        }
    }

    /// Section heading, or [`UNKNOWN_SECTION`] when the document had none
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_SECTION)
    }

    /// Section heading as found in the document, if any
    pub fn raw_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A normalized paper: title plus sections in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    title: Option<String>,
    sections: Vec<Section>,
}

impl Paper {
    pub fn new(title: Option<String>, sections: Vec<Section>) -> Self {
        Self {
            title: non_blank(title),
            sections,
        }
    }

    /// Paper title, or [`UNKNOWN_TITLE`] when the document had none
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_TITLE)
    }

    pub fn raw_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

/// Model output for a single section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section_title: String,
    pub summary: String,
}

impl SectionSummary {
    pub fn new(section_title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            section_title: section_title.into(),
            summary: summary.into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
