use std::time::Duration;

use engine_logging::engine_trace;
use feed_core::{Story, StoryId};
use futures_util::StreamExt;
use serde_json::Value;
use url::Url;

use crate::{EngineError, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Upper bound on record fetches running at once within one batch.
    pub max_in_flight: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 2 * 1024 * 1024,
            max_in_flight: 32,
        }
    }
}

/// Remote side of a feed: the ranking and the records it names.
#[async_trait::async_trait]
pub trait StorySource: Send + Sync {
    /// The current ranking, best first.
    async fn fetch_ranking(&self) -> Result<Vec<StoryId>, FetchError>;

    /// One record; `Ok(None)` when the remote answers with a null payload.
    async fn fetch_story(&self, id: StoryId) -> Result<Option<Story>, FetchError>;
}

/// `StorySource` over the Hacker News Firebase API layout:
/// `{base}beststories.json` and `{base}item/{id}.json`.
#[derive(Debug, Clone)]
pub struct ReqwestSource {
    base: Url,
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestSource {
    pub fn new(base_url: &str, settings: FetchSettings) -> Result<Self, EngineError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized).map_err(|err| EngineError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))?;

        Ok(Self {
            base,
            client,
            settings,
        })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        engine_trace!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::new(FailureKind::HttpStatus(status.as_u16()), reason));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl StorySource for ReqwestSource {
    async fn fetch_ranking(&self) -> Result<Vec<StoryId>, FetchError> {
        let url = self.endpoint("beststories.json")?;
        let value = self.get_json(url).await?;
        serde_json::from_value(value)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    async fn fetch_story(&self, id: StoryId) -> Result<Option<Story>, FetchError> {
        let url = self.endpoint(&format!("item/{id}.json"))?;
        match self.get_json(url).await? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string())),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
