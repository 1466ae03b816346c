use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{ContentKind, DiscoveredCandidate},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TEMPERATURE: f32 = 0.8;
const MAX_TOKENS: u32 = 600;

/// Confidence assigned to entries recovered by the free-text fallback parser
const FALLBACK_CONFIDENCE: f32 = 0.7;
/// Confidence assumed when a structured entry omits the field
const DEFAULT_CONFIDENCE: f32 = 0.8;

const SYSTEM_PROMPT: &str = "You are a movie and TV discovery assistant. Respond with a JSON \
    array of objects shaped like {\"title\": string, \"kind\": \"movie\" or \"tv\", \
    \"confidence\": number between 0 and 1}. Respond with actual content titles only. Never \
    include streaming service or platform names, category labels, or commentary.";

/// Source of discovery candidates for a single query
///
/// Implementations own their failure domain: a failed query returns an
/// error that the batch method converts into zero candidates.
#[async_trait::async_trait]
pub trait DiscoveryBackend: Send + Sync {
    /// Runs one natural-language query and returns its candidates
    async fn run_query(&self, query: &str) -> AppResult<Vec<DiscoveredCandidate>>;

    /// Clone backend for parallel task execution
    fn clone_for_task(&self) -> Box<dyn DiscoveryBackend>;

    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Runs all queries concurrently and joins results in launch order
    ///
    /// A query that fails contributes nothing and never aborts its
    /// siblings. Only the case where every query failed and none
    /// succeeded is reported as an upstream error.
    async fn discover_batch(&self, queries: &[String]) -> AppResult<Vec<DiscoveredCandidate>> {
        let mut tasks = Vec::new();

        for query in queries {
            let backend = self.clone_for_task();
            let query = query.clone();
            tasks.push(tokio::spawn(async move { backend.run_query(&query).await }));
        }

        let mut candidates = Vec::new();
        let mut successes = 0usize;
        let mut failures = 0usize;

        for (task, query) in tasks.into_iter().zip(queries) {
            match task.await {
                Ok(Ok(mut found)) => {
                    successes += 1;
                    candidates.append(&mut found);
                }
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::warn!(
                        error = %e,
                        query = %query,
                        backend = self.name(),
                        "Discovery query failed; contributing zero candidates"
                    );
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(error = %e, query = %query, "Discovery task join error");
                }
            }
        }

        if successes == 0 && failures > 0 {
            return Err(AppError::ExternalApi(
                "All discovery queries failed".to_string(),
            ));
        }

        tracing::info!(
            queries = queries.len(),
            failed = failures,
            candidates = candidates.len(),
            backend = self.name(),
            "Discovery batch completed"
        );

        Ok(candidates)
    }
}

/// Client for an OpenAI-compatible AI search endpoint
#[derive(Clone)]
pub struct AiSearchClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl AiSearchClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            http_client,
            api_key,
            api_url,
            model,
        }
    }
}

#[async_trait::async_trait]
impl DiscoveryBackend for AiSearchClient {
    async fn run_query(&self, query: &str) -> AppResult<Vec<DiscoveredCandidate>> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": query },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "AI search returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        let candidates = parse_candidates(content);

        tracing::debug!(
            query = %query,
            candidates = candidates.len(),
            "Discovery query parsed"
        );

        Ok(candidates)
    }

    fn clone_for_task(&self) -> Box<dyn DiscoveryBackend> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "ai-search"
    }
}

/// Raw structured candidate as the AI is asked to emit it
///
/// Field aliases tolerate the envelope drifting between responses.
#[derive(Debug, Deserialize)]
struct RawCandidate {
    title: String,
    #[serde(default, alias = "type", alias = "media_type")]
    kind: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default, alias = "url", alias = "link")]
    stream_url: Option<String>,
    #[serde(default, alias = "service")]
    provider: Option<String>,
}

/// Parses an answer that is either a JSON array or free text
pub fn parse_candidates(content: &str) -> Vec<DiscoveredCandidate> {
    if let Some(structured) = parse_structured(content) {
        return structured;
    }
    parse_free_text(content)
}

/// Attempts the structured JSON-array parse, tolerating code fences
///
/// A parseable array is authoritative even when empty: `[]` is a valid
/// zero-candidate answer and must not fall through to the text parser.
fn parse_structured(content: &str) -> Option<Vec<DiscoveredCandidate>> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }

    let raw: Vec<RawCandidate> = serde_json::from_str(&content[start..=end]).ok()?;

    let candidates = raw
        .into_iter()
        .filter(|c| !c.title.trim().is_empty())
        .map(|c| DiscoveredCandidate {
            title: c.title.trim().to_string(),
            kind: c
                .kind
                .as_deref()
                .map(ContentKind::parse)
                .unwrap_or(ContentKind::Movie),
            stream_url: c.stream_url.filter(|u| !u.is_empty()),
            provider: c.provider.filter(|p| !p.is_empty()),
            confidence: c.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0),
        })
        .collect::<Vec<_>>();

    Some(candidates)
}

/// Line-oriented fallback for free-text answers
///
/// Extracts "N. Title", "- Title", and "• Title" lines, classifies kind
/// from series/show/season wording, and assigns a fixed lower confidence.
/// Unmarked prose lines are not candidates.
fn parse_free_text(content: &str) -> Vec<DiscoveredCandidate> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.ends_with(':') {
                return None;
            }

            let kind = classify_kind(line);
            let title = clean_title_line(line)?;

            Some(DiscoveredCandidate {
                title,
                kind,
                stream_url: None,
                provider: None,
                confidence: FALLBACK_CONFIDENCE,
            })
        })
        .collect()
}

/// Heuristic kind classification for free-text lines
fn classify_kind(line: &str) -> ContentKind {
    let lower = line.to_lowercase();
    if lower.contains("series") || lower.contains("show") || lower.contains("season") {
        ContentKind::Tv
    } else {
        ContentKind::Movie
    }
}

/// Strips the list marker and trailing annotations from a free-text line
///
/// A line carrying neither a numeric prefix nor a bullet marker is prose,
/// not a list entry, and yields no title.
fn clean_title_line(line: &str) -> Option<String> {
    let mut text = line;
    let mut marked = false;

    // "12. Title" / "12) Title"
    if let Some(pos) = text.find(['.', ')']) {
        if !text[..pos].is_empty() && text[..pos].chars().all(|c| c.is_ascii_digit()) {
            text = text[pos + 1..].trim_start();
            marked = true;
        }
    }

    // "- Title" / "* Title" / "• Title"
    if !marked {
        let stripped = text.trim_start_matches(['-', '*', '•']).trim_start();
        if stripped.len() < text.len() {
            text = stripped;
            marked = true;
        }
    }

    if !marked {
        return None;
    }

    // Markdown emphasis and quoting
    let text = text.replace("**", "");
    let text = text.trim_matches('"').trim();

    // Trailing " - description" or parenthetical like " (2021 TV series)"
    let text = text
        .split_once(" - ")
        .map(|(head, _)| head)
        .unwrap_or(text);
    let text = text
        .split_once(" (")
        .map(|(head, _)| head)
        .unwrap_or(text)
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
