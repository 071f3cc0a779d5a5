// Public modules
pub mod config;
pub mod html;
pub mod llm;
pub mod models;
pub mod normalizer;
pub mod prompt;
pub mod report;
pub mod summarizer;
pub mod tei;

// Re-export commonly used types
pub use config::Config;
pub use html::{parse_html, HtmlNormalizer};
pub use llm::{build_model, CompletionModel, Provider};
pub use models::{Paper, Section, SectionSummary, UNKNOWN_SECTION, UNKNOWN_TITLE};
pub use normalizer::{normalizer_for, Normalizer, SourceFormat};
pub use prompt::build_prompt;
pub use report::{save_report, PaperReport};
pub use summarizer::Summarizer;
pub use tei::{parse_tei, XmlNormalizer};
