//! Fail-closed client for language-model explanations of findings.
//!
//! - Tries an ordered provider chain (OpenAI, then Gemini).
//! - Maintains a simple in-memory cache with stale fallbacks.
//! - Never fails the caller: without a usable provider the finding's
//!   canonical advisory text is returned verbatim.
//!
//! Invoked only after evaluation completes; nothing here can alter a
//! verdict or its findings.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::domain::verdict::{Finding, FindingCode};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const USER_AGENT: &str = "cargo-precheck-advisor/1.0.0";

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned no usable text")]
    EmptyResponse,
    #[error("no explanation provider is configured")]
    MissingCredentials,
}

/// Where an explanation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplanationSource {
    Provider(&'static str),
    Cached,
    Stale,
    Verbatim,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

#[derive(Clone)]
pub struct ExplainClient {
    http: Client,
    openai_url: Url,
    gemini_url: Url,
    openai_key: Option<String>,
    gemini_key: Option<String>,
    cache: Arc<Mutex<HashMap<FindingCode, Cached>>>,
    ttl: Duration,
}

impl ExplainClient {
    /// Builds a client with provider keys from `OPENAI_API_KEY` and
    /// `GEMINI_API_KEY`. Absent keys are fine; the client then always
    /// falls back to verbatim finding text.
    pub fn from_env() -> Result<Self, ExplainError> {
        let openai_key = std::env::var("OPENAI_API_KEY").ok();
        let gemini_key = std::env::var("GEMINI_API_KEY").ok();
        Self::with_keys(openai_key, gemini_key)
    }

    pub fn with_keys(
        openai_key: Option<String>,
        gemini_key: Option<String>,
    ) -> Result<Self, ExplainError> {
        let openai_url = Url::parse(OPENAI_BASE_URL)?;
        let gemini_url = Url::parse(GEMINI_BASE_URL)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            openai_url,
            gemini_url,
            openai_key: openai_key.filter(|key| !key.is_empty()),
            gemini_key: gemini_key.filter(|key| !key.is_empty()),
            cache: Arc::new(Mutex::new(HashMap::new())),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Explains a finding, failing closed: cached text first, then the
    /// provider chain, then a stale cache entry, and finally the finding's
    /// canonical message verbatim.
    pub async fn explain(&self, finding: &Finding) -> Explanation {
        if let Some(text) = self.cached(finding.code).await {
            return Explanation {
                text,
                source: ExplanationSource::Cached,
            };
        }

        match self.ask_providers(&prompt_for(finding)).await {
            Ok((text, provider)) => {
                self.store(finding.code, text.clone()).await;
                Explanation {
                    text,
                    source: ExplanationSource::Provider(provider),
                }
            }
            Err(error) => {
                println!(
                    "[explain] provider chain failed for {}: {error}; falling back",
                    finding.code.as_str()
                );
                if let Some(text) = self.cached_stale(finding.code).await {
                    return Explanation {
                        text,
                        source: ExplanationSource::Stale,
                    };
                }
                Explanation {
                    text: finding.message.clone(),
                    source: ExplanationSource::Verbatim,
                }
            }
        }
    }

    /// Raw provider call without the verbatim fallback, for callers that
    /// want to distinguish "no explanation" from "explained".
    pub async fn try_explain(&self, finding: &Finding) -> Result<String, ExplainError> {
        let (text, _provider) = self.ask_providers(&prompt_for(finding)).await?;
        self.store(finding.code, text.clone()).await;
        Ok(text)
    }

    async fn ask_providers(&self, prompt: &str) -> Result<(String, &'static str), ExplainError> {
        let mut last_error: Option<ExplainError> = None;

        if let Some(key) = self.openai_key.as_deref() {
            match self.ask_openai(prompt, key).await {
                Ok(text) => return Ok((text, "openai")),
                Err(error) => {
                    println!("[explain] OpenAI request failed: {error}; trying next provider");
                    last_error = Some(error);
                }
            }
        }

        if let Some(key) = self.gemini_key.as_deref() {
            match self.ask_gemini(prompt, key).await {
                Ok(text) => return Ok((text, "gemini")),
                Err(error) => {
                    println!("[explain] Gemini request failed: {error}");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or(ExplainError::MissingCredentials))
    }

    async fn ask_openai(&self, prompt: &str, key: &str) -> Result<String, ExplainError> {
        let body = ChatRequest {
            model: OPENAI_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response: ChatResponse = self
            .http
            .post(self.openai_url.clone())
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ExplainError::EmptyResponse)
    }

    async fn ask_gemini(&self, prompt: &str, key: &str) -> Result<String, ExplainError> {
        let mut url = self.gemini_url.clone();
        url.query_pairs_mut().append_pair("key", key);

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };
        let response: GeminiResponse = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ExplainError::EmptyResponse)
    }

    async fn cached(&self, code: FindingCode) -> Option<String> {
        let cache = self.cache.lock().await;
        cache.get(&code).and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_stale(&self, code: FindingCode) -> Option<String> {
        let cache = self.cache.lock().await;
        cache.get(&code).map(|entry| entry.text.clone())
    }

    async fn store(&self, code: FindingCode, text: String) {
        let mut cache = self.cache.lock().await;
        cache.insert(
            code,
            Cached {
                text,
                fetched_at: SystemTime::now(),
            },
        );
    }
}

fn prompt_for(finding: &Finding) -> String {
    format!(
        "You are a professional air cargo counter agent.\n\
         Explain this problem in detail and how to resolve it:\n\n\
         {}\n\n\
         Include:\n\
         - What it means\n\
         - The operational risk\n\
         - The legal risk\n\
         - How to correct it\n\
         - Where the client should go next",
        finding.message
    )
}

struct Cached {
    text: String,
    fetched_at: SystemTime,
}

impl Cached {
    fn if_fresh(&self, ttl: Duration) -> Option<String> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(self.text.clone())
        } else {
            None
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiReplyContent,
}

#[derive(Deserialize)]
struct GeminiReplyContent {
    parts: Vec<GeminiReplyPart>,
}

#[derive(Deserialize)]
struct GeminiReplyPart {
    text: String,
}
