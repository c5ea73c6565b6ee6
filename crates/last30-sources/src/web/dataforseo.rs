//! DataForSEO Google AI Mode.
//!
//! Sends one to three natural-language questions (by depth) to the live AI
//! Mode endpoint and turns the references cited by each AI overview into
//! findings. Google already curated these, so they carry a fixed relevance
//! hint.

use std::collections::HashSet;

use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use last30_core::urls::host_of;
use last30_core::{Finding, SourceKind};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::http::check_response;
use crate::text::truncate_chars;
use crate::web::is_excluded;
use crate::{DiscoveryRequest, SourceClient, query};

/// Task status meaning "Ok." in DataForSEO responses.
const TASK_OK: u32 = 20000;
/// United States.
const LOCATION_CODE: u32 = 2840;
const RELEVANCE_HINT: f64 = 0.75;
const MAX_TITLE: usize = 200;
const MAX_SNIPPET: usize = 500;
const MAX_MENTION: usize = 150;

/// References and overview text from all questions of one search.
#[derive(Debug, Default)]
pub struct AiModeAnswer {
    pub findings: Vec<Finding>,
    pub overview: Option<String>,
}

#[derive(Serialize)]
struct AiModeTask<'a> {
    keyword: &'a str,
    location_code: u32,
    language_code: &'a str,
}

#[derive(Deserialize)]
struct AiModeResponse {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct Task {
    #[serde(default)]
    status_code: u32,
    #[serde(default)]
    status_message: String,
    #[serde(default)]
    result: Option<Vec<TaskResult>>,
}

#[derive(Deserialize)]
struct TaskResult {
    #[serde(default)]
    items: Option<Vec<ResultItem>>,
}

#[derive(Deserialize)]
struct ResultItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    references: Option<Vec<Reference>>,
}

#[derive(Deserialize)]
struct Reference {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

impl SourceClient {
    /// Ask Google AI Mode the depth's questions about the topic.
    ///
    /// Individual question failures are logged; the search fails only when
    /// every question failed.
    ///
    /// # Errors
    ///
    /// Returns the last question's [`SourceError`] when none succeeded.
    pub async fn search_dataforseo(&self, request: &DiscoveryRequest) -> Result<AiModeAnswer, SourceError> {
        let questions = query::ai_mode_questions(&request.topic, request.depth, query::window_year(request));
        let credentials = format!(
            "{}:{}",
            self.credentials.dataforseo_login, self.credentials.dataforseo_password
        );
        let auth = format!("Basic {}", BASE64_STANDARD.encode(credentials));

        let mut answer = AiModeAnswer::default();
        let mut seen = HashSet::new();
        let mut last_error = None;
        let mut answered = 0usize;

        for question in &questions {
            match self.ai_mode_question(question, &auth).await {
                Ok((findings, overview)) => {
                    answered += 1;
                    answer
                        .findings
                        .extend(findings.into_iter().filter(|f| seen.insert(f.url.clone())));
                    if overview.is_some() {
                        answer.overview = overview;
                    }
                }
                Err(e) => {
                    tracing::warn!(question = question.as_str(), %e, "AI mode question failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if answered == 0 => Err(e),
            _ => Ok(answer),
        }
    }

    async fn ai_mode_question(
        &self,
        question: &str,
        auth: &str,
    ) -> Result<(Vec<Finding>, Option<String>), SourceError> {
        let url = format!(
            "{}/serp/google/ai_mode/live/advanced",
            self.endpoints.dataforseo.trim_end_matches('/')
        );
        let payload = [AiModeTask {
            keyword: question,
            location_code: LOCATION_CODE,
            language_code: "en",
        }];
        let resp = check_response(
            self.http
                .post(&url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .json(&payload)
                .send()
                .await?,
        )
        .await?;

        let data: AiModeResponse = resp.json().await?;
        parse_answer(data)
    }
}

fn parse_answer(data: AiModeResponse) -> Result<(Vec<Finding>, Option<String>), SourceError> {
    let Some(task) = data.tasks.into_iter().next() else {
        return Ok((Vec::new(), None));
    };
    if task.status_code != TASK_OK {
        return Err(SourceError::Parse(format!(
            "task failed ({}): {}",
            task.status_code, task.status_message
        )));
    }

    let items = task
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.items)
        .unwrap_or_default();

    let mut findings = Vec::new();
    let mut overview = None;
    for item in items.into_iter().filter(|i| i.kind == "ai_overview") {
        let text = item.markdown.or(item.text).filter(|t| !t.trim().is_empty());
        findings.extend(
            item.references
                .unwrap_or_default()
                .into_iter()
                .filter_map(|reference| reference_finding(reference, text.as_deref())),
        );
        if text.is_some() {
            overview = text;
        }
    }
    Ok((findings, overview))
}

/// The overview sentence that talks about a reference, found by its domain
/// and then by the first words of its title.
fn extract_mention(overview: &str, title: &str, domain: &str) -> Option<String> {
    let mut terms = Vec::with_capacity(2);
    if !domain.trim().is_empty() {
        terms.push(domain.trim().to_lowercase());
    }
    let words: Vec<&str> = title.split_whitespace().take(4).collect();
    if words.len() >= 2 {
        terms.push(words.join(" ").to_lowercase());
    }

    let flat = overview.replace('\n', " ");
    // Split on ". " so dotted domains stay inside their sentence.
    let sentences: Vec<&str> = flat
        .split(". ")
        .map(|s| s.trim().trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .collect();
    terms.iter().find_map(|term| {
        sentences
            .iter()
            .find(|sentence| sentence.to_lowercase().contains(term.as_str()))
            .map(|sentence| truncate_chars(sentence, MAX_MENTION))
    })
}

fn reference_finding(reference: Reference, overview: Option<&str>) -> Option<Finding> {
    let url = reference.url.filter(|u| !u.trim().is_empty())?;
    if is_excluded(&url) {
        return None;
    }
    let title = reference.title.unwrap_or_default();
    let snippet = reference.text.or(reference.snippet).unwrap_or_default();
    if title.trim().is_empty() && snippet.trim().is_empty() {
        return None;
    }
    let domain = host_of(&url).or(reference.domain);
    let mention = overview.and_then(|text| extract_mention(text, &title, domain.as_deref().unwrap_or_default()));

    let mut finding = Finding::new(SourceKind::Web, url, truncate_chars(title.trim(), MAX_TITLE))
        .with_snippet(truncate_chars(snippet.trim(), MAX_SNIPPET))
        .with_relevance_hint(RELEVANCE_HINT);
    if let Some(domain) = domain {
        finding = finding.with_community(domain);
    }
    if let Some(mention) = mention {
        finding = finding.with_why_relevant(mention);
    }
    Some(finding)
}
