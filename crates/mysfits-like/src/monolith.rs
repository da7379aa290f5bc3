use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use mysfits_core::MysfitId;

use crate::errors::LikeError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What the monolith answered, passed back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub status: StatusCode,
    pub body: String,
}

/// The monolith endpoints the like service depends on.
#[async_trait]
pub trait Monolith: Send + Sync {
    /// `GET /` on the monolith.
    async fn health(&self) -> Result<Upstream, LikeError>;

    /// `POST /mysfits/{id}/fulfill-like` on the monolith.
    async fn fulfill_like(&self, mysfit_id: &MysfitId) -> Result<Upstream, LikeError>;
}

pub struct MonolithClient {
    http: reqwest::Client,
    base_url: String,
}

impl MonolithClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LikeError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn upstream(resp: reqwest::Response) -> Result<Upstream, LikeError> {
        let status = resp.status();
        let body = resp.text().await?;
        Ok(Upstream { status, body })
    }
}

#[async_trait]
impl Monolith for MonolithClient {
    async fn health(&self) -> Result<Upstream, LikeError> {
        let resp = self.http.get(format!("{}/", self.base_url)).send().await?;
        Self::upstream(resp).await
    }

    async fn fulfill_like(&self, mysfit_id: &MysfitId) -> Result<Upstream, LikeError> {
        let resp = self
            .http
            .post(format!("{}/mysfits/{mysfit_id}/fulfill-like", self.base_url))
            .send()
            .await?;
        Self::upstream(resp).await
    }
}
