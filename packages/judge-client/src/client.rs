use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::JudgeClientError;
use crate::models::{Evaluation, EvaluationRequest, Judge0Response};

/// A synchronous-submission judge: runs one program against one test case and
/// reports a verdict with resource usage.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
    ) -> Result<Evaluation, JudgeClientError>;
}

/// HTTP client for a Judge0-compatible execution service.
///
/// Uses the blocking-wait protocol (`?base64_encoded=false&wait=true`): the
/// judge runs the program before responding, so one call yields one verdict.
pub struct Judge0Client {
    submissions_url: Url,
    api_key: Option<String>,
    client: Client,
}

impl Judge0Client {
    /// `base_url` is the service root (e.g. `https://ce.judge0.com`).
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, JudgeClientError> {
        let submissions_url = Url::parse(&format!(
            "{}/submissions",
            base_url.trim_end_matches('/')
        ))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            submissions_url,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl JudgeClient for Judge0Client {
    async fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
    ) -> Result<Evaluation, JudgeClientError> {
        let mut url = self.submissions_url.clone();
        url.set_query(Some("base64_encoded=false&wait=true"));

        let mut req = self.client.post(url).json(request);
        if let Some(ref key) = self.api_key {
            req = req.header("X-RapidAPI-Key", key);
        }

        let res = req.send().await?.error_for_status()?;
        let wire: Judge0Response = res
            .json()
            .await
            .map_err(|e| JudgeClientError::UnexpectedResponse(e.to_string()))?;

        debug!(verdict = %wire.status.description, "judge evaluation complete");
        Ok(wire.into())
    }
}
