//! Base URLs of the remote APIs.
//!
//! Overridable for proxies and for pointing clients at local test servers.

use serde::{Deserialize, Serialize};

fn default_openai() -> String {
    String::from("https://api.openai.com/v1")
}

fn default_xai() -> String {
    String::from("https://api.x.ai/v1")
}

fn default_youtube() -> String {
    String::from("https://www.googleapis.com/youtube/v3")
}

fn default_brave() -> String {
    String::from("https://api.search.brave.com/res/v1")
}

fn default_openrouter() -> String {
    String::from("https://openrouter.ai/api/v1")
}

fn default_dataforseo() -> String {
    String::from("https://api.dataforseo.com/v3")
}

fn default_supadata() -> String {
    String::from("https://api.supadata.ai/v1")
}

fn default_reddit() -> String {
    String::from("https://www.reddit.com")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_openai")]
    pub openai: String,
    #[serde(default = "default_xai")]
    pub xai: String,
    #[serde(default = "default_youtube")]
    pub youtube: String,
    #[serde(default = "default_brave")]
    pub brave: String,
    #[serde(default = "default_openrouter")]
    pub openrouter: String,
    #[serde(default = "default_dataforseo")]
    pub dataforseo: String,
    #[serde(default = "default_supadata")]
    pub supadata: String,
    /// Public Reddit host used for thread enrichment.
    #[serde(default = "default_reddit")]
    pub reddit: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            openai: default_openai(),
            xai: default_xai(),
            youtube: default_youtube(),
            brave: default_brave(),
            openrouter: default_openrouter(),
            dataforseo: default_dataforseo(),
            supadata: default_supadata(),
            reddit: default_reddit(),
        }
    }
}
