//! TEI XML normalizer.
//!
//! PDFs are posted to a GROBID service, which answers with a TEI document.
//! Sections are the parents of `<head n="…">` elements carrying a plain
//! integer ordinal; their body is every `<p>` underneath that parent.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

use crate::models::{Paper, Section};
use crate::normalizer::Normalizer;

pub const FULLTEXT_ENDPOINT: &str = "/api/processFulltextDocument";

/// Deepest element nesting accepted from the service
pub const MAX_DEPTH: usize = 1024;

static SECTION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// Structures local PDFs through a GROBID service
pub struct XmlNormalizer {
    client: Client,
    endpoint: String,
}

impl XmlNormalizer {
    pub fn new(grobid_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = format!("{}{}", grobid_url.trim_end_matches('/'), FULLTEXT_ENDPOINT);

        Ok(Self { client, endpoint })
    }

    async fn process_fulltext(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input.pdf".to_string());

        tracing::debug!(
            endpoint = %self.endpoint,
            file = %path.display(),
            "posting document to GROBID"
        );

        let form = Form::new().part("input", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Failed to send document to GROBID")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("GROBID returned error: {} - {}", status, error_text);
        }

        response.text().await.context("Failed to read GROBID response")
    }
}

#[async_trait]
impl Normalizer for XmlNormalizer {
    async fn normalize(&self, source: &str) -> Result<Paper> {
        let path = source_path(source)?;
        let xml = self.process_fulltext(&path).await?;
        parse_tei(&xml)
    }
}

/// Accept either a filesystem path or a `file://` URL
pub fn source_path(source: &str) -> Result<PathBuf> {
    if !source.starts_with("file://") {
        return Ok(PathBuf::from(source));
    }

    let url = Url::parse(source).with_context(|| format!("Invalid file URL: {}", source))?;
    url.to_file_path()
        .map_err(|_| anyhow::anyhow!("Not a local file URL: {}", source))
}

/// Split a TEI document into titled sections
pub fn parse_tei(xml: &str) -> Result<Paper> {
    let root = parse_tree(xml)?;

    let title = root
        .find_first("title")
        .context("TEI document has no <title> element")?
        .text();
    if title.trim().is_empty() {
        tracing::info!("empty <title> element, using placeholder title");
    }

    let mut sections = Vec::new();
    collect_sections(&root, &mut sections);

    Ok(Paper::new(Some(title), sections))
}

fn collect_sections(scope: &XmlElement, sections: &mut Vec<Section>) {
    for child in scope.child_elements() {
        let numbered = child.name == "head"
            && child
                .attribute("n")
                .is_some_and(|n| SECTION_NUMBER.is_match(n));

        if numbered {
            let mut paragraphs = Vec::new();
            scope.collect_named("p", &mut paragraphs);

            let mut section_text = String::new();
            for paragraph in paragraphs {
                section_text.push_str(&paragraph.text());
                section_text.push('\n');
            }

            sections.push(Section::new(Some(child.text()), section_text.trim()));
        }

        collect_sections(child, sections);
    }
}

#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

#[derive(Debug)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.context("Malformed XML attribute")?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .context("Malformed XML attribute value")?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    fn find_first(&self, name: &str) -> Option<&XmlElement> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_first(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant element named `name`, in document order
    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        for child in self.child_elements() {
            if child.name == name {
                out.push(child);
            }
            child.collect_named(name, out);
        }
    }

    fn text(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(element) => element.push_text(out),
            }
        }
    }
}

fn parse_tree(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    // Synthetic document node at the bottom of the stack
    let mut stack = vec![XmlElement::default()];

    loop {
        match reader.read_event().context("Failed to parse TEI XML")? {
            Event::Start(ref e) => {
                if stack.len() > MAX_DEPTH {
                    anyhow::bail!("TEI XML nests deeper than {} elements", MAX_DEPTH);
                }
                stack.push(XmlElement::from_start(e)?);
            }
            Event::Empty(ref e) => {
                let element = XmlElement::from_start(e)?;
                append(&mut stack, XmlNode::Element(element));
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    anyhow::bail!("Unbalanced closing tag in TEI XML");
                }
                if let Some(element) = stack.pop() {
                    append(&mut stack, XmlNode::Element(element));
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape().context("Malformed XML text")?;
                append(&mut stack, XmlNode::Text(text.into_owned()));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append(&mut stack, XmlNode::Text(text));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        anyhow::bail!("TEI XML ended with unclosed elements");
    }

    stack.pop().context("TEI XML produced no document")
}

fn append(stack: &mut [XmlElement], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}
