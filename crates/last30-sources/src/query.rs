//! Query shaping: prompts for LLM-backed sources and search strings for the
//! rest.

use chrono::Datelike;
use last30_core::{Depth, EntityKind};

use crate::DiscoveryRequest;

/// Leading phrases that describe the research rather than the subject.
const FILLER_PREFIXES: [&str; 12] = [
    "what are the best",
    "what is the best",
    "what are the latest",
    "what are people saying about",
    "what do people think about",
    "how do i use",
    "how to use",
    "how to",
    "what are",
    "what is",
    "tips for",
    "best practices for",
];

/// Words that dilute a video search. Content types such as "tutorial" or
/// "review" are kept on purpose.
const NOISE_WORDS: [&str; 25] = [
    "best",
    "top",
    "good",
    "great",
    "awesome",
    "killer",
    "latest",
    "new",
    "news",
    "update",
    "updates",
    "trending",
    "hottest",
    "popular",
    "viral",
    "practices",
    "features",
    "recommendations",
    "advice",
    "prompt",
    "prompts",
    "prompting",
    "methods",
    "strategies",
    "approaches",
];

/// Strip research filler from `topic`, leaving the core subject.
///
/// Falls back to the lowercased topic when everything would be stripped.
#[must_use]
pub fn core_subject(topic: &str) -> String {
    let mut text = topic
        .trim()
        .trim_end_matches(['?', '!', '.'])
        .to_lowercase();
    for prefix in FILLER_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            if rest.starts_with(' ') {
                text = rest.trim().to_string();
            }
        }
    }

    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|word| !NOISE_WORDS.contains(word))
        .collect();
    if kept.is_empty() {
        return text.clone();
    }
    kept.join(" ")
}

/// Natural-language questions for Google AI Mode, more at higher depth.
#[must_use]
pub fn ai_mode_questions(topic: &str, depth: Depth, year: i32) -> Vec<String> {
    let questions = [
        format!("What are the biggest {topic} trends and what's driving them?"),
        format!("Who are the top influencers and brands in {topic} right now?"),
        format!("What do experts recommend for {topic} in {year}?"),
    ];
    questions
        .into_iter()
        .take(depth.web_question_count())
        .collect()
}

/// Year of the window end, used in time-anchored questions.
#[must_use]
pub fn window_year(request: &DiscoveryRequest) -> i32 {
    request.window.end.year()
}

const ITEM_SCHEMA: &str = r#"Respond with a single JSON object and nothing else:
{"items": [{"url": "...", "title": "...", "snippet": "...", "author": "...", "community": "...", "date": "YYYY-MM-DD", "relevance": 0.0}]}
"relevance" is how closely the item matches the topic, from 0 to 1. Omit fields you do not know."#;

/// Prompt for Reddit discovery through web search.
#[must_use]
pub fn reddit_prompt(request: &DiscoveryRequest) -> String {
    let mut prompt = format!(
        "Find Reddit threads discussing: {topic}\n\
         Only include threads created between {from} and {to}.\n\
         Return between {min} and {max} distinct threads, each a reddit.com/r/<community>/comments/ URL.\n",
        topic = request.topic,
        from = request.window.from_date(),
        to = request.window.to_date(),
        min = request.bounds.min,
        max = request.bounds.max,
    );
    if let Some(target) = request.target.as_ref().filter(|t| t.kind == EntityKind::Community) {
        prompt.push_str(&format!("Search only inside r/{}.\n", target.name));
    }
    prompt.push_str("Use the community name without the r/ prefix and the author without u/.\n");
    prompt.push_str(ITEM_SCHEMA);
    prompt
}

/// Prompt for X discovery through `x_search`.
#[must_use]
pub fn x_prompt(request: &DiscoveryRequest) -> String {
    let mut prompt = format!(
        "Find posts on X about: {topic}\n\
         Only include posts from {from} to {to}.\n\
         Return between {min} and {max} distinct posts, each an x.com/<handle>/status/<id> URL.\n",
        topic = request.topic,
        from = request.window.from_date(),
        to = request.window.to_date(),
        min = request.bounds.min,
        max = request.bounds.max,
    );
    if let Some(target) = request.target.as_ref().filter(|t| t.kind == EntityKind::Handle) {
        prompt.push_str(&format!("Only include posts from:{}.\n", target.name));
    }
    prompt.push_str(
        "Use the author handle without @ as \"author\". Include \"likes\", \"reposts\", \
         \"replies\" and \"quotes\" counts when known.\n",
    );
    prompt.push_str(ITEM_SCHEMA);
    prompt
}

/// Prompt for web discovery through a search-grounded chat model.
#[must_use]
pub fn web_prompt(request: &DiscoveryRequest) -> String {
    format!(
        "Search the web for recent articles, blog posts and documentation about: {topic}\n\
         Prefer pages published between {from} and {to}. Do not include reddit.com, x.com or twitter.com pages.\n\
         Return up to {max} results. Use the site name as \"community\".\n{ITEM_SCHEMA}",
        topic = request.topic,
        from = request.window.from_date(),
        to = request.window.to_date(),
        max = request.bounds.max,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use last30_core::{DateWindow, Entity, ResultBounds};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn request() -> DiscoveryRequest {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        DiscoveryRequest::discovery(
            "claude code",
            DateWindow::ending_at(now, 30),
            Depth::Default,
            ResultBounds::new(20, 30),
        )
    }

    #[rstest]
    #[case("What are the best Claude Code prompts?", "claude code")]
    #[case("tips for rust async", "rust async")]
    #[case("latest news on Kubernetes", "on kubernetes")]
    #[case("best practices for CI tutorial", "ci tutorial")]
    #[case("Best new", "best new")]
    fn strips_filler(#[case] topic: &str, #[case] expected: &str) {
        assert_eq!(core_subject(topic), expected);
    }

    #[test]
    fn question_count_follows_depth() {
        assert_eq!(ai_mode_questions("rust", Depth::Quick, 2026).len(), 1);
        assert_eq!(ai_mode_questions("rust", Depth::Default, 2026).len(), 2);
        let deep = ai_mode_questions("rust", Depth::Deep, 2026);
        assert_eq!(deep.len(), 3);
        assert!(deep[2].ends_with("rust in 2026?"));
    }

    #[test]
    fn reddit_prompt_carries_window_and_bounds() {
        let prompt = reddit_prompt(&request());
        assert!(prompt.contains("claude code"));
        assert!(prompt.contains("2026-03-01"));
        assert!(prompt.contains("between 20 and 30"));
        assert!(!prompt.contains("Search only inside"));
    }

    #[test]
    fn prompts_respect_target_kind() {
        let community = request().supplemental(Entity {
            kind: EntityKind::Community,
            name: "ClaudeAI".into(),
            mentions: 4,
        });
        assert!(reddit_prompt(&community).contains("Search only inside r/ClaudeAI"));
        assert!(!x_prompt(&community).contains("from:"));

        let handle = request().supplemental(Entity {
            kind: EntityKind::Handle,
            name: "bcherny".into(),
            mentions: 2,
        });
        assert!(x_prompt(&handle).contains("from:bcherny"));
    }
}
