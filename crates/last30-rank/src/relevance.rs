//! Lexical relevance of a finding to the research topic.
//!
//! The topic is tokenized once into [`QueryTerms`]. A finding's lexical score
//! is the fraction of query tokens present in its title, snippet, and
//! community, plus [`PHRASE_BONUS`] when the whole topic appears verbatim.
//! A source-supplied relevance hint is averaged in when present.

use std::collections::HashSet;

use last30_core::Finding;

/// Added when the full topic phrase appears in the title or snippet.
pub const PHRASE_BONUS: f64 = 0.2;

const STOPWORDS: [&str; 40] = [
    "a", "about", "all", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for",
    "from", "how", "i", "in", "is", "it", "its", "me", "my", "of", "on", "or", "should", "so",
    "that", "the", "this", "to", "vs", "was", "what", "when", "which", "who", "why", "with",
];

/// Lowercased alphanumeric tokens of `text`, in order of appearance.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Tokenized research topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerms {
    tokens: Vec<String>,
    phrase: String,
}

impl QueryTerms {
    /// Tokenize `topic`, dropping stopwords and duplicates.
    ///
    /// A topic made only of stopwords keeps all of its tokens so it still
    /// matches something.
    #[must_use]
    pub fn new(topic: &str) -> Self {
        let all: Vec<String> = tokenize(topic).collect();
        let mut seen = HashSet::new();
        let mut tokens: Vec<String> = all
            .iter()
            .filter(|t| !is_stopword(t))
            .filter(|t| seen.insert((*t).clone()))
            .cloned()
            .collect();
        if tokens.is_empty() {
            tokens = all.iter().filter(|t| seen.insert((*t).clone())).cloned().collect();
        }
        Self {
            tokens,
            phrase: all.join(" "),
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Lexical score of `finding` in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn lexical(&self, finding: &Finding) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        let community = finding.community.as_deref().unwrap_or_default();
        let haystack: HashSet<String> = tokenize(&finding.title)
            .chain(tokenize(&finding.snippet))
            .chain(tokenize(community))
            .collect();
        let matched = self.tokens.iter().filter(|t| haystack.contains(*t)).count();
        let mut score = matched as f64 / self.tokens.len() as f64;
        if self.phrase_appears(finding) {
            score += PHRASE_BONUS;
        }
        score.min(1.0)
    }

    fn phrase_appears(&self, finding: &Finding) -> bool {
        if self.phrase.is_empty() {
            return false;
        }
        [&finding.title, &finding.snippet].into_iter().any(|text| {
            let normalized: Vec<String> = tokenize(text).collect();
            format!(" {} ", normalized.join(" ")).contains(&format!(" {} ", self.phrase))
        })
    }
}

/// Relevance of `finding` in `[0, 1]`.
///
/// The mean of the source hint and the lexical score when a hint exists,
/// otherwise the lexical score alone.
#[must_use]
pub fn relevance(terms: &QueryTerms, finding: &Finding) -> f64 {
    let lexical = terms.lexical(finding);
    let score = finding
        .relevance_hint
        .map_or(lexical, |hint| f64::midpoint(hint.clamp(0.0, 1.0), lexical));
    score.clamp(0.0, 1.0)
}
