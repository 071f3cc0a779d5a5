use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::html::HtmlNormalizer;
use crate::models::Paper;
use crate::tei::XmlNormalizer;

/// Converts one external document format into a [`Paper`]
#[async_trait]
pub trait Normalizer: Send + Sync {
    async fn normalize(&self, source: &str) -> Result<Paper>;
}

/// Which normalizer a source should go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// arXiv URL, fetched from its ar5iv HTML rendering
    Html,
    /// Local PDF, structured by a GROBID service into TEI XML
    Xml,
}

pub fn normalizer_for(format: SourceFormat, config: &Config) -> Result<Box<dyn Normalizer>> {
    let normalizer: Box<dyn Normalizer> = match format {
        SourceFormat::Html => Box::new(HtmlNormalizer::new()?),
        SourceFormat::Xml => Box::new(XmlNormalizer::new(&config.grobid_url)?),
    };
    Ok(normalizer)
}
