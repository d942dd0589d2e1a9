use super::GenerationService;
use crate::error::GenerateError;
use crate::model::{GenerateRequest, GenerateResponse, ServiceConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// reqwest-backed client for the remote generation endpoint.
#[derive(Clone)]
pub struct HttpGenerationClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpGenerationClient {
    pub fn new(cfg: &ServiceConfig) -> Result<Self> {
        let endpoint = reqwest::Url::parse(&cfg.endpoint)
            .with_context(|| format!("invalid endpoint URL: {}", cfg.endpoint))?;
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("build http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(GenerateError::Network)?;

        // Non-2xx is a failure no matter what the body says.
        if !resp.status().is_success() {
            return Err(GenerateError::Status(resp.status()));
        }

        let body: GenerateResponse = resp.json().await.map_err(GenerateError::InvalidBody)?;
        body.into_reply()
    }
}
