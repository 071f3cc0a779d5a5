use anyhow::Result;
use futures::stream::{self, Stream, TryStreamExt};

use crate::llm::CompletionModel;
use crate::models::{Paper, SectionSummary};
use crate::prompt::build_prompt;

/// Summarizes a paper section by section through a completion model
pub struct Summarizer {
    model: Box<dyn CompletionModel>,
}

impl Summarizer {
    pub fn new(model: Box<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Lazily summarize each section in document order.
    ///
    /// A section's model call only starts when the stream is polled for it,
    /// and the stream ends right after the first error.
    pub fn summarize<'a>(
        &'a self,
        paper: &'a Paper,
    ) -> impl Stream<Item = Result<SectionSummary>> + Send + 'a {
        stream::try_unfold(0usize, move |index| async move {
            let Some(section) = paper.sections().get(index) else {
                return Ok(None);
            };

            tracing::debug!(
                section = section.title(),
                index,
                total = paper.sections().len(),
                "summarizing section"
            );

            let prompt = build_prompt(paper.title(), section.title(), section.text());
            let summary = self.model.complete(&prompt).await?;

            Ok::<_, anyhow::Error>(Some((
                SectionSummary::new(section.title(), summary),
                index + 1,
            )))
        })
    }

    /// Summarize every section, failing the whole request on the first error
    pub async fn summarize_all(&self, paper: &Paper) -> Result<Vec<SectionSummary>> {
        self.summarize(paper).try_collect().await
    }
}
