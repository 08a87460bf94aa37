use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent timed out")]
    Timeout,

    #[error("agent returned HTTP {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("undecodable agent response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Timeout
        } else if err.is_decode() {
            AgentError::Decode(err.to_string())
        } else {
            AgentError::Network(err.to_string())
        }
    }
}

/// A document the agent found relevant to a question.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: f64,
}

/// Answer returned by the fiscal research agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub documents_found: u64,
    #[serde(default)]
    pub sources: Vec<AgentSource>,
}

/// Thin client for the hosted fiscal research agent consumed by the
/// regulatory watch.
#[derive(Debug, Clone)]
pub struct FiscalAgentClient {
    http: reqwest::Client,
    target: Url,
    timeout: Duration,
}

impl FiscalAgentClient {
    pub fn new(target: Url, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            target,
            timeout,
        }
    }

    pub async fn ask(&self, question: &str) -> Result<AgentAnswer, AgentError> {
        let response = self
            .http
            .post(self.target.clone())
            .json(&serde_json::json!({ "question": question }))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<AgentAnswer>().await?)
    }
}
