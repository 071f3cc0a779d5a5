use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::models::{Paper, Section};
use crate::normalizer::Normalizer;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static SECTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("section.ltx_section").expect("valid selector"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2").expect("valid selector"));
static BLOCK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div").expect("valid selector"));

/// Rewrite an arXiv reference to its ar5iv HTML rendering
pub fn mirror_url(url: &str) -> String {
    url.replace("arxiv", "ar5iv")
}

/// Fetches papers from the ar5iv HTML mirror
pub struct HtmlNormalizer {
    client: Client,
}

impl HtmlNormalizer {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; PaperSummarizer/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "fetching paper HTML");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error fetching {}: {}", url, status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl Normalizer for HtmlNormalizer {
    async fn normalize(&self, source: &str) -> Result<Paper> {
        let url = mirror_url(source);
        let html = self.fetch(&url).await?;
        Ok(parse_html(&html))
    }
}

/// Split an ar5iv-style HTML document into titled sections
pub fn parse_html(html: &str) -> Paper {
    let document = Html::parse_document(html);

    let title = document.select(&TITLE_SELECTOR).next().map(element_text);
    if title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        tracing::info!("no title heading found, using placeholder title");
    }

    let sections = document
        .select(&SECTION_SELECTOR)
        .map(|section_element| {
            let section_title = section_element
                .select(&HEADING_SELECTOR)
                .next()
                .map(element_text);
            if section_title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                tracing::info!("section heading not found, using placeholder section title");
            }

            // Nested divs contribute their text once per enclosing div as well
            let mut section_text = String::new();
            for block in section_element.select(&BLOCK_SELECTOR) {
                section_text.push_str(&element_text(block));
                section_text.push('\n');
            }

            Section::new(section_title, section_text.trim())
        })
        .collect();

    Paper::new(title, sections)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
