use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::{Paper, SectionSummary};

/// Complete summarization result for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperReport {
    pub version: String,
    pub created_at: String,
    pub title: String,
    pub source: String,
    pub model: String,
    pub sections: Vec<SectionSummary>,
}

impl PaperReport {
    pub fn new(paper: &Paper, source: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            title: paper.title().to_string(),
            source: source.into(),
            model: model.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, summary: SectionSummary) {
        self.sections.push(summary);
    }
}

/// Paper heading, printed before any section arrives
pub fn render_title(title: &str) -> String {
    format!("## {}\n\n", title)
}

pub fn render_section(summary: &SectionSummary) -> String {
    format!(
        "### {}\n\n{}\n\n---\n\n",
        summary.section_title,
        summary.summary.trim_end()
    )
}

/// Save a report as pretty-printed JSON
pub fn save_report(report: &PaperReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;

    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    fn sample_report() -> PaperReport {
        let paper = Paper::new(
            Some("Example Paper".to_string()),
            vec![Section::new(Some("Introduction".to_string()), "A study of X.")],
        );
        let mut report = PaperReport::new(&paper, "https://arxiv.org/abs/1", "gpt-3.5-turbo");
        report.push(SectionSummary::new("Introduction", "- point\n"));
        report
    }

    #[test]
    fn test_markdown_layout() {
        let report = sample_report();
        let mut markdown = render_title(&report.title);
        for summary in &report.sections {
            markdown.push_str(&render_section(summary));
        }
        assert_eq!(
            markdown,
            "## Example Paper\n\n### Introduction\n\n- point\n\n---\n\n"
        );
    }

    #[test]
    fn test_report_uses_rendered_title() {
        let paper = Paper::new(None, Vec::new());
        let report = PaperReport::new(&paper, "src", "m");
        assert_eq!(report.title, "unknown title");
        assert!(report.sections.is_empty());
    }

    #[test]
    fn test_save_report_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        let report = sample_report();
        save_report(&report, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let saved: PaperReport = serde_json::from_str(&content).unwrap();
        assert_eq!(saved.version, "1.0");
        assert_eq!(saved.title, "Example Paper");
        assert_eq!(saved.model, "gpt-3.5-turbo");
        assert_eq!(saved.sections, report.sections);
    }
}
