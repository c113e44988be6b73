//! Provider selection from API keys in the environment.

use std::fmt;

use crate::error::Error;
use crate::Result;

/// Supported LLM providers, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenRouter,
    Together,
    Groq,
    HuggingFace,
    OpenAi,
}

impl Provider {
    /// All providers, highest priority first.
    pub const ALL: [Provider; 5] = [
        Provider::OpenRouter,
        Provider::Together,
        Provider::Groq,
        Provider::HuggingFace,
        Provider::OpenAi,
    ];

    /// Environment variable holding the API key.
    pub fn env_var(self) -> &'static str {
        match self {
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Together => "TOGETHER_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::HuggingFace => "HF_TOKEN",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// OpenAI-compatible base URL (without `/chat/completions`).
    pub fn base_url(self) -> &'static str {
        match self {
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Together => "https://api.together.xyz/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::HuggingFace => "https://router.huggingface.co/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenRouter => "qwen/qwen-2.5-7b-instruct",
            Provider::Together => "Qwen/Qwen2.5-7B-Instruct",
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::HuggingFace => "Qwen/Qwen2.5-Coder-32B-Instruct",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::OpenRouter => "OpenRouter",
            Provider::Together => "Together AI",
            Provider::Groq => "Groq",
            Provider::HuggingFace => "Hugging Face",
            Provider::OpenAi => "OpenAI",
        };
        f.write_str(name)
    }
}

/// Everything needed to talk to the selected provider.
#[derive(Clone)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("provider", &self.provider)
            .field("api_key", &mask(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

impl ProviderSettings {
    /// Select a provider from the process environment.
    pub fn from_env(model_override: Option<&str>) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), model_override)
    }

    /// Select the first provider whose key `lookup` returns non-empty.
    pub fn from_lookup<F>(lookup: F, model_override: Option<&str>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for provider in Provider::ALL {
            let Some(api_key) = lookup(provider.env_var()).filter(|k| !k.trim().is_empty()) else {
                continue;
            };

            let model = model_override
                .filter(|m| !m.is_empty())
                .unwrap_or(provider.default_model())
                .to_string();

            tracing::debug!(%provider, %model, "Selected LLM provider");
            return Ok(Self { provider, api_key, model });
        }

        let vars: Vec<&str> = Provider::ALL.iter().map(|p| p.env_var()).collect();
        Err(Error::Config(format!(
            "No API key found! Please set one of: {} (a .env file works too)",
            vars.join(", ")
        )))
    }
}

/// Show the first few characters of a secret; short ones are hidden entirely.
pub fn mask(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 8 {
        return format!("***({} chars)", len);
    }
    let prefix: String = secret.chars().take(5).collect();
    format!("{}...({} chars)", prefix, len)
}
