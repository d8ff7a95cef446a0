//! Environment-driven server configuration
//!
//! | Variable           | Default                                           |
//! |--------------------|---------------------------------------------------|
//! | `BNS_DATA_PATH`    | `data/bns_sections.json`                          |
//! | `INDEX_HTML_PATH`  | `static/index.html`                               |
//! | `HOST`             | `0.0.0.0`                                         |
//! | `PORT`             | `8000`                                            |
//! | `GROQ_API_KEY`     | unset (questions fail with a configuration error) |
//! | `GROQ_API_URL`     | Groq chat completions endpoint                    |
//! | `GROQ_MODEL`       | `llama-3.3-70b-versatile`                         |
//! | `LLM_TIMEOUT_SECS` | `30`                                              |

use std::path::PathBuf;
use std::time::Duration;

use crate::llm::LlmConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub index_html_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/bns_sections.json"),
            index_html_path: PathBuf::from("static/index.html"),
            host: "0.0.0.0".to_string(),
            port: 8000,
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unparseable numbers keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let timeout = var("LLM_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&s| s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.llm.timeout);

        Self {
            data_path: var("BNS_DATA_PATH").map(PathBuf::from).unwrap_or(defaults.data_path),
            index_html_path: var("INDEX_HTML_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_html_path),
            host: var("HOST").unwrap_or(defaults.host),
            port,
            llm: LlmConfig {
                api_key: var("GROQ_API_KEY"),
                api_url: var("GROQ_API_URL").unwrap_or(defaults.llm.api_url),
                model: var("GROQ_MODEL").unwrap_or(defaults.llm.model),
                timeout,
                ..defaults.llm
            },
        }
    }
}
