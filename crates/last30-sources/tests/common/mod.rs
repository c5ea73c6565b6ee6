#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use last30_config::{Last30Config, LocalTools};
use last30_core::{DateWindow, Depth, SourceKind};
use last30_sources::{DiscoveryRequest, SourceClient};
use serde_json::{Value, json};

pub fn config_for(uri: &str) -> Last30Config {
    let mut config = Last30Config::default();
    config.endpoints.openai = uri.to_string();
    config.endpoints.xai = uri.to_string();
    config.endpoints.youtube = uri.to_string();
    config.endpoints.brave = uri.to_string();
    config.endpoints.openrouter = uri.to_string();
    config.endpoints.dataforseo = uri.to_string();
    config.endpoints.supadata = uri.to_string();
    config.endpoints.reddit = uri.to_string();
    config.models.backoff_ms = 1;
    config
}

pub fn client(config: &Last30Config) -> SourceClient {
    SourceClient::new(config, LocalTools::default()).unwrap()
}

pub fn request(source: SourceKind, depth: Depth) -> DiscoveryRequest {
    let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
    DiscoveryRequest::discovery(
        "rust async runtimes",
        DateWindow::ending_at(now, 30),
        depth,
        depth.discovery_bounds(source),
    )
}

/// A Responses API body whose output text is `{"items": items}`.
pub fn responses_body(items: &Value) -> Value {
    json!({
        "id": "resp_1",
        "output": [
            {"type": "web_search_call", "status": "completed"},
            {
                "type": "message",
                "role": "assistant",
                "content": [{
                    "type": "output_text",
                    "text": format!("Here is what I found:\n{}", json!({"items": items}))
                }]
            }
        ]
    })
}
