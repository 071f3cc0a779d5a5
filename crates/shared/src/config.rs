use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_GROBID_URL: &str = "http://localhost:8070";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub grobid_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            grobid_url: DEFAULT_GROBID_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let defaults = Self::default();

        Ok(Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            openai_base_url: non_empty_var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL")
                .unwrap_or(defaults.anthropic_base_url),
            grobid_url: non_empty_var("GROBID_URL").unwrap_or(defaults.grobid_url),
        })
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().context(
            "OPENAI_API_KEY not found.\n\n\
            To fix this, create ~/.config/paper-summarizer/.env with:\n  \
            OPENAI_API_KEY=your_key_here\n\n\
            Get your OpenAI API key from: https://platform.openai.com/api-keys",
        )
    }

    pub fn anthropic_api_key(&self) -> Result<&str> {
        self.anthropic_api_key.as_deref().context(
            "ANTHROPIC_API_KEY not found.\n\n\
            To fix this, create ~/.config/paper-summarizer/.env with:\n  \
            ANTHROPIC_API_KEY=your_key_here\n\n\
            Get your Anthropic API key from: https://console.anthropic.com/settings/keys",
        )
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/paper-summarizer/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("paper-summarizer").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_grobid() {
        let config = Config::default();
        assert_eq!(config.grobid_url, "http://localhost:8070");
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn test_missing_key_reports_how_to_fix() {
        let config = Config::default();
        let err = config.openai_api_key().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY not found"));
        assert!(config.anthropic_api_key().is_err());
    }

    #[test]
    fn test_present_key_is_returned() {
        let config = Config {
            anthropic_api_key: Some("sk-ant".to_string()),
            ..Config::default()
        };
        assert_eq!(config.anthropic_api_key().unwrap(), "sk-ant");
    }
}
