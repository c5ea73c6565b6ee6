//! Backing model selection for LLM-backed sources.

use serde::{Deserialize, Serialize};

fn default_reddit_models() -> Vec<String> {
    vec![
        String::from("gpt-4.1"),
        String::from("gpt-4.1-mini"),
        String::from("gpt-4o-mini"),
    ]
}

fn default_x_models() -> Vec<String> {
    vec![String::from("grok-4-fast")]
}

fn default_openrouter_model() -> String {
    String::from("perplexity/sonar")
}

const fn default_attempts_per_model() -> u32 {
    2
}

const fn default_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Fallback chain for Reddit search, preferred model first.
    #[serde(default = "default_reddit_models")]
    pub reddit: Vec<String>,

    /// Fallback chain for X search, preferred model first.
    #[serde(default = "default_x_models")]
    pub x: Vec<String>,

    /// Model used for OpenRouter web search.
    #[serde(default = "default_openrouter_model")]
    pub openrouter: String,

    /// Attempts per model before moving down the chain.
    #[serde(default = "default_attempts_per_model")]
    pub attempts_per_model: u32,

    /// Delay before the first retry; doubles on every further retry.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            reddit: default_reddit_models(),
            x: default_x_models(),
            openrouter: default_openrouter_model(),
            attempts_per_model: default_attempts_per_model(),
            backoff_ms: default_backoff_ms(),
        }
    }
}
