use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OUTPUT_DIR: &str = "medias/docs";
pub const DEFAULT_COVER: &str = "/home/ubuntu/docs_notion/assets/greencover.jpg";
pub const DEFAULT_PUBLISH_COMMAND: &str = "wenyan";
pub const DEFAULT_PUBLISH_ARGS: &str = "publish -f {file}";
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Default)]
pub struct SearchSettings {
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,
    pub exa_api_key: Option<String>,
    pub exa_base_url: String,
}

#[derive(Clone, Default)]
pub struct OpenAiSettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Clone, Default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Clone)]
pub struct PublishSettings {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct Settings {
    pub search: SearchSettings,
    pub openai: OpenAiSettings,
    pub gemini: GeminiSettings,
    pub publish: PublishSettings,
    pub output_dir: PathBuf,
    pub covers: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let covers = get("COVER_IMAGES")
            .map(|v| {
                v.split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_COVER.to_string()]);

        let timeout = get("PUBLISH_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PUBLISH_TIMEOUT);

        Self {
            search: SearchSettings {
                tavily_api_key: get("TAVILY_API_KEY"),
                tavily_base_url: get("TAVILY_BASE_URL")
                    .map(trim_base_url)
                    .unwrap_or_else(|| DEFAULT_TAVILY_BASE_URL.to_string()),
                exa_api_key: get("EXA_API_KEY"),
                exa_base_url: get("EXA_BASE_URL")
                    .map(trim_base_url)
                    .unwrap_or_else(|| DEFAULT_EXA_BASE_URL.to_string()),
            },
            openai: OpenAiSettings {
                base_url: get("LLM_API_BASE_URL").map(trim_base_url),
                api_key: get("LLM_API_KEY"),
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            },
            gemini: GeminiSettings {
                base_url: get("LLM_GEMINI_API_BASE_URL")
                    .map(trim_base_url)
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                api_key: get("GEMINI_API_KEY"),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            publish: PublishSettings {
                app_id: get("WECHAT_APP_ID"),
                app_secret: get("WECHAT_APP_SECRET"),
                command: get("PUBLISH_COMMAND").unwrap_or_else(|| DEFAULT_PUBLISH_COMMAND.to_string()),
                args: get("PUBLISH_ARGS")
                    .unwrap_or_else(|| DEFAULT_PUBLISH_ARGS.to_string())
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                timeout,
            },
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            covers,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
        }
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<set>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSettings")
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .field("tavily_base_url", &self.tavily_base_url)
            .field("exa_api_key", &redact(&self.exa_api_key))
            .field("exa_base_url", &self.exa_base_url)
            .finish()
    }
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

impl fmt::Debug for PublishSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishSettings")
            .field("app_id", &redact(&self.app_id))
            .field("app_secret", &redact(&self.app_secret))
            .field("command", &self.command)
            .field("args", &self.args)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("search", &self.search)
            .field("openai", &self.openai)
            .field("gemini", &self.gemini)
            .field("publish", &self.publish)
            .field("output_dir", &self.output_dir)
            .field("covers", &self.covers)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]);
        assert_eq!(s.openai.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(s.gemini.model, DEFAULT_GEMINI_MODEL);
        assert!(s.openai.base_url.is_none());
        assert_eq!(s.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(s.covers, vec![DEFAULT_COVER.to_string()]);
        assert_eq!(s.publish.args, vec!["publish", "-f", "{file}"]);
        assert_eq!(s.publish.timeout, DEFAULT_PUBLISH_TIMEOUT);
        assert_eq!(s.port, 3000);
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let s = settings(&[("LLM_API_KEY", "   "), ("LLM_API_BASE_URL", "https://llm.local/")]);
        assert!(s.openai.api_key.is_none());
        assert_eq!(s.openai.base_url.as_deref(), Some("https://llm.local"));
    }

    #[test]
    fn test_cover_list_and_timeout() {
        let s = settings(&[
            ("COVER_IMAGES", "a.jpg, b.jpg,,"),
            ("PUBLISH_TIMEOUT_SECS", "5"),
            ("PORT", "8080"),
        ]);
        assert_eq!(s.covers, vec!["a.jpg", "b.jpg"]);
        assert_eq!(s.publish.timeout, Duration::from_secs(5));
        assert_eq!(s.port, 8080);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let s = settings(&[("LLM_API_KEY", "sk-secret"), ("WECHAT_APP_SECRET", "shh")]);
        let debug = format!("{:?}", s);
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("shh"));
        assert!(debug.contains("<set>"));
    }
}
