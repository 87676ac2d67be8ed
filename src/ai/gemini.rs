//! Gemini wire client.
//!
//! Thin adapter over the generateContent REST endpoint. ureq is a blocking
//! agent, so the async trait methods run the calls under `spawn_blocking`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{parse_suggestion, Assistant, RiskVerdict, Suggestion};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const GENERATE_PROMPT: &str = "\
You are an AI assistant that generates accurate Linux Bash commands based on user requests.
The request may be written in any language; detect the intent regardless.
Respond with only two lines of plain text, no markdown and no greetings.
The first line is the correct and commonly used Bash command using standard tools.
The second line begins with \"Explanation:\" followed by one concise English sentence
describing the command's main function and key options.
Keep the command simple and on a single line unless the request demands otherwise.

The task is: {INPUT}
";

const RISK_PROMPT: &str = "\
Analyze risk of Linux command: `{COMMAND}`
Is it potentially destructive (data loss/modification, system config change, format)
OR does it typically require sudo/root privileges to run safely?
- If YES: respond with \"Risky: [brief one-sentence explanation of the primary risk]\".
- If NO: respond with exactly \"Safe\".
ONLY output the result. No extra text.
";

const EXPLAIN_PROMPT: &str = "\
Explain the following Linux concept or command to someone new to Linux.
Be clear and concise: cover the main purpose, common usage, and a short
practical example with the command written out.

The concept or command: {INPUT}
";

/// Assistant implementation backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(30))
                .build(),
            api_key,
            model,
        }
    }

    /// One blocking generateContent round-trip, returning the joined text of
    /// the first candidate.
    fn request_text(&self, prompt: String) -> Result<String> {
        #[derive(serde::Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(serde::Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(serde::Serialize)]
        struct Request<'a> {
            contents: Vec<Content<'a>>,
        }

        #[derive(serde::Deserialize)]
        struct ResponsePart {
            text: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ResponseContent {
            parts: Option<Vec<ResponsePart>>,
        }
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Candidate {
            content: Option<ResponseContent>,
            finish_reason: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        let url = format!(
            "{API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response: Response = self
            .agent
            .post(&url)
            .send_json(Request {
                contents: vec![Content {
                    parts: vec![Part { text: &prompt }],
                }],
            })
            .context("Gemini API request failed")?
            .into_json()
            .context("failed to parse Gemini API response")?;

        let candidate = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .context("Gemini response contained no candidates")?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            bail!("AI request blocked by safety filter; try rephrasing");
        }

        let text: String = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            bail!("AI response was empty");
        }
        Ok(text)
    }

    async fn request_text_async(&self, prompt: String) -> Result<String> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.request_text(prompt))
            .await
            .context("Gemini request task failed")?
    }
}

#[async_trait]
impl Assistant for GeminiClient {
    async fn generate(&self, request: &str) -> Result<Suggestion> {
        let prompt = GENERATE_PROMPT.replace("{INPUT}", request);
        let text = self.request_text_async(prompt).await?;
        debug!(raw = %text, "generation response");
        parse_suggestion(&text)
    }

    async fn assess(&self, command: &str) -> RiskVerdict {
        let prompt = RISK_PROMPT.replace("{COMMAND}", command);
        match self.request_text_async(prompt).await {
            Ok(text) => RiskVerdict::from_response(&text),
            Err(e) => RiskVerdict::Risky(format!(
                "risk assessment failed ({e:#}); treat the command as potentially risky"
            )),
        }
    }

    async fn explain(&self, topic: &str) -> Result<String> {
        let prompt = EXPLAIN_PROMPT.replace("{INPUT}", topic);
        let text = self.request_text_async(prompt).await?;
        Ok(text.trim().to_string())
    }
}
