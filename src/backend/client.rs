//! HTTP client for the alien backend

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, multipart, Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::models::{AlienRequest, BackendReply, ErrorReply, TextRequest};
use crate::config::FeelienConfig;
use crate::errors::{FeelienError, Result};
use crate::types::{Environment, Personality};

const ALIEN_PATH: &str = "/api/alien";
const TEXT_PATH: &str = "/process-text";
const AUDIO_PATH: &str = "/process-audio";

/// Everything the application needs from the backend.
#[async_trait]
pub trait AlienBackend: Send + Sync {
    /// Fetch the latest alien state.
    async fn poll(&self) -> Result<BackendReply>;

    /// Put the alien back to its initial state.
    async fn reset(&self) -> Result<BackendReply>;

    async fn vocalize(&self, environment: &Environment) -> Result<BackendReply>;

    /// Talk to the alien.
    async fn process_text(&self, text: &str, personality: &Personality) -> Result<BackendReply>;

    /// Upload a recording; the reply carries both a transcript and an answer.
    async fn process_audio(&self, path: &Path, personality: &Personality) -> Result<BackendReply>;

    /// Speech to text only.
    async fn transcribe(&self, path: &Path, personality: &Personality) -> Result<String> {
        match self.process_audio(path, personality).await? {
            BackendReply::Chat(reply) => reply
                .transcript
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| FeelienError::parse("No transcript returned")),
            BackendReply::State(_) => Err(FeelienError::parse(
                "Expected a chat reply from the audio endpoint",
            )),
        }
    }
}

/// `reqwest` implementation of [`AlienBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Arc<String>,
    source: Arc<String>,
    system_prompt: Arc<String>,
}

impl HttpBackend {
    pub fn new(config: &FeelienConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&format!("feelien/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|e| FeelienError::configuration(format!("Invalid user agent: {e}")))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| FeelienError::network(format!("Failed to create HTTP client: {e}")))?;

        let base_url = config.backend_url.trim_end_matches('/').to_string();
        info!("Backend client initialized with base URL: {}", base_url);

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            source: Arc::new(config.source.clone()),
            system_prompt: Arc::new(config.system_prompt.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<BackendReply> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| connect_error(&e, &self.base_url))?;
        handle_response(response).await
    }
}

fn connect_error(error: &reqwest::Error, base_url: &str) -> FeelienError {
    if error.is_connect() {
        FeelienError::network(format!("Backend not reachable at {base_url}: {error}"))
    } else if error.is_timeout() {
        FeelienError::network(format!("Backend timed out: {error}"))
    } else {
        FeelienError::network(format!("Request failed: {error}"))
    }
}

async fn handle_response(response: Response) -> Result<BackendReply> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| FeelienError::network(format!("Failed to read response: {e}")))?;
    parse_reply(status, &body)
}

fn parse_reply(status: StatusCode, body: &str) -> Result<BackendReply> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorReply>(body)
            .ok()
            .and_then(|reply| reply.error)
            .unwrap_or_else(|| "Request failed".to_string());
        warn!("Backend returned {}: {}", status, message);
        return Err(FeelienError::ApiError {
            status: status.as_u16(),
            message: Arc::new(message),
        });
    }

    let reply = BackendReply::from_json(body).map_err(|e| {
        FeelienError::parse(format!("Failed to parse response: {e}. Response body: {body}"))
    })?;

    // Chat endpoints report model failures in the body with a 200 status.
    if let BackendReply::Chat(chat) = &reply {
        if !chat.success && (chat.error.is_some() || chat.content.is_none()) {
            let message = chat
                .error
                .clone()
                .unwrap_or_else(|| "Request failed".to_string());
            warn!("Backend reported failure: {}", message);
            return Err(FeelienError::ApiError {
                status: status.as_u16(),
                message: Arc::new(message),
            });
        }
    }
    Ok(reply)
}

#[async_trait]
impl AlienBackend for HttpBackend {
    async fn poll(&self) -> Result<BackendReply> {
        self.post_json(ALIEN_PATH, &AlienRequest::poll(&self.source))
            .await
    }

    async fn reset(&self) -> Result<BackendReply> {
        info!("Resetting alien");
        self.post_json(ALIEN_PATH, &AlienRequest::reset(&self.source))
            .await
    }

    async fn vocalize(&self, environment: &Environment) -> Result<BackendReply> {
        environment.validate()?;
        self.post_json(
            ALIEN_PATH,
            &AlienRequest::vocalization(&self.source, *environment),
        )
        .await
    }

    async fn process_text(&self, text: &str, personality: &Personality) -> Result<BackendReply> {
        let request = TextRequest {
            text: text.to_string(),
            system_prompt: self.system_prompt.to_string(),
            alien_parameters: Some(*personality),
        };
        self.post_json(TEXT_PATH, &request).await?.into_chat()
    }

    async fn process_audio(&self, path: &Path, personality: &Personality) -> Result<BackendReply> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "recording.mp3".to_string(), |n| n.to_string_lossy().to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!("Uploading {} ({} bytes, {})", file_name, bytes.len(), mime);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("systemPrompt", self.system_prompt.to_string())
            .text("alienParameters", serde_json::to_string(personality)?);

        let url = self.url(AUDIO_PATH);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| connect_error(&e, &self.base_url))?;
        handle_response(response).await?.into_chat()
    }
}
