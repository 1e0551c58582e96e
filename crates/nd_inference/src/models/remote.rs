use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nd_core::{Error, Result, Sentiment};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::InferenceModel;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CATEGORIES: &[&str] = &[
    "Technology",
    "Business",
    "Politics",
    "Sports",
    "Science",
    "World",
];

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Annotation via an OpenAI-compatible chat-completions endpoint.
pub struct RemoteModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
}

impl RemoteModel {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key: api_key.unwrap_or_default(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: "gpt-4o-mini".to_string(),
        })
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::Inference("empty completion response".to_string()))
    }
}

impl fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for RemoteModel {
    fn name(&self) -> &str {
        "remote"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following news article in at most three sentences:\n\n{}\n\nSummary:",
            text
        );
        self.ask(prompt).await
    }

    async fn categorize(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Classify the following news article into exactly one of these categories: {}.\n\
             Reply with the category name only.\n\n{}",
            CATEGORIES.join(", "),
            text
        );
        let answer = self.ask(prompt).await?;

        CATEGORIES
            .iter()
            .find(|c| answer.eq_ignore_ascii_case(c))
            .map(|c| c.to_string())
            .ok_or_else(|| Error::Inference(format!("unexpected category: {}", answer)))
    }

    async fn sentiment(&self, text: &str) -> Result<Sentiment> {
        let prompt = format!(
            "Rate the sentiment of the following news article. Reply with a label, \
             POSITIVE or NEGATIVE, followed by a confidence between 0 and 1, \
             separated by a space. Example: POSITIVE 0.87\n\n{}",
            text
        );
        let answer = self.ask(prompt).await?;

        let mut parts = answer.split_whitespace();
        let label = match parts.next() {
            Some(l) if l.eq_ignore_ascii_case("POSITIVE") => "POSITIVE",
            Some(l) if l.eq_ignore_ascii_case("NEGATIVE") => "NEGATIVE",
            _ => {
                return Err(Error::Inference(format!(
                    "unexpected sentiment reply: {}",
                    answer
                )))
            }
        };
        let score = parts
            .next()
            .and_then(|s| s.parse::<f32>().ok())
            .ok_or_else(|| Error::Inference(format!("unexpected sentiment reply: {}", answer)))?;

        Ok(Sentiment::new(label, score.clamp(0.0, 1.0)))
    }
}
