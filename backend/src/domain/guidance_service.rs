//! Guidance chat: the temple's AI assistant backed by the external
//! generative-language API.
//!
//! The collaborator is deliberately opaque: it returns a display string in
//! every case. A missing credential and a transport failure both map to
//! fixed sentinel messages, never to an error the widget would have to
//! interpret.

use async_trait::async_trait;
use log::{error, info};
use serde::{Deserialize, Serialize};
use shared::{ChatMessage, ChatRole};
use std::sync::{Arc, Mutex};

/// Reply when no API credential is configured.
pub const MISSING_KEY_REPLY: &str = "请配置 API Key 以启用智能护法功能。";
/// Reply when the service call fails or returns nothing usable.
pub const APOLOGY_REPLY: &str = "阿弥陀佛，网络连接似乎有些波动，请稍后再试。";
/// Reply when the model answers with an empty body.
pub const EMPTY_REPLY: &str = "阿弥陀佛，小僧暂时无法回答，请稍后再试。";

const SYSTEM_INSTRUCTION: &str = "\
你是一位多伦多大觉寺（Manju Wisdom Buddhist Institute）的'智能护法'（AI助手）。\
你的语气庄严、慈悲、平和，富有智慧，但又非常亲切易懂。\
回答用户关于佛教基础知识的问题，介绍寺院的课程和法务活动；\
如果用户询问捐款，请礼貌地引导他们去网站的'功德护持'页面。\
回答要精简，富有禅意，不要过于冗长。";

const MODEL: &str = "gemini-2.5-flash";

#[async_trait]
pub trait GuidanceClient: Send + Sync {
    /// Produce guidance text for a prompt. Infallible by contract: every
    /// failure mode is folded into the returned string.
    async fn generate_guidance(&self, prompt: &str) -> String;
}

/// Client for the Google generative-language API.
pub struct GeminiClient {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// `api_key` is read from process configuration by the caller; the
    /// client only cares whether it is present.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    async fn call(&self, key: &str, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/models/{MODEL}:generateContent?key={key}", self.base_url);
        let body = GenerateContentRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.7 },
        };

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("generateContent failed with status {}", response.status());
        }
        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .unwrap_or_default();
        Ok(text)
    }
}

#[async_trait]
impl GuidanceClient for GeminiClient {
    async fn generate_guidance(&self, prompt: &str) -> String {
        let Some(key) = self.api_key.clone() else {
            return MISSING_KEY_REPLY.to_string();
        };
        match self.call(&key, prompt).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                error!("Guidance call failed: {e:#}");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Chat widget service: keeps the transcript and relays prompts to the
/// guidance client.
#[derive(Clone)]
pub struct GuidanceService {
    client: Arc<dyn GuidanceClient>,
    transcript: Arc<Mutex<Vec<ChatMessage>>>,
}

impl GuidanceService {
    pub fn new(client: Arc<dyn GuidanceClient>) -> Self {
        Self {
            client,
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Ask a question: the prompt and the reply are both appended to the
    /// transcript, and the reply is returned for immediate display.
    pub async fn ask(&self, message: &str) -> String {
        info!("Chat: prompt received ({} chars)", message.len());
        self.transcript.lock().unwrap().push(ChatMessage {
            role: ChatRole::User,
            text: message.to_string(),
        });
        let reply = self.client.generate_guidance(message).await;
        self.transcript.lock().unwrap().push(ChatMessage {
            role: ChatRole::Model,
            text: reply.clone(),
        });
        reply
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedClient(String);

    #[async_trait]
    impl GuidanceClient for CannedClient {
        async fn generate_guidance(&self, _prompt: &str) -> String {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_missing_key_returns_sentinel() {
        let client = GeminiClient::new(None);
        assert_eq!(client.generate_guidance("什么是四圣谛？").await, MISSING_KEY_REPLY);

        let blank = GeminiClient::new(Some("   ".to_string()));
        assert_eq!(blank.generate_guidance("什么是四圣谛？").await, MISSING_KEY_REPLY);
    }

    #[tokio::test]
    async fn test_ask_records_both_sides_of_the_exchange() {
        let service = GuidanceService::new(Arc::new(CannedClient("阿弥陀佛。".to_string())));
        let reply = service.ask("师父好").await;
        assert_eq!(reply, "阿弥陀佛。");

        let transcript = service.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[0].text, "师父好");
        assert_eq!(transcript[1].role, ChatRole::Model);
        assert_eq!(transcript[1].text, "阿弥陀佛。");
    }
}
