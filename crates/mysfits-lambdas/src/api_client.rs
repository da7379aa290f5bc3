use std::time::Duration;

use async_trait::async_trait;
use mysfits_core::{MysfitId, MysfitProfile};
use tracing::{info, warn};

use crate::errors::LookupError;

/// Upper bound on a single lookup, so a stalled API cannot hold the batch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of mysfit profiles for click enrichment.
#[async_trait]
pub trait MysfitLookup: Send + Sync {
    async fn fetch_mysfit(&self, mysfit_id: &MysfitId) -> Result<MysfitProfile, LookupError>;
}

/// Client for the public mysfits API.
#[derive(Clone)]
pub struct MysfitsApiClient {
    http: reqwest::Client,
    base_url: String,
    retry_delays: Vec<Duration>,
}

impl MysfitsApiClient {
    /// Create a client for the API rooted at `base_url`
    /// (for example `https://abc123.execute-api.us-east-1.amazonaws.com/prod`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            retry_delays: vec![
                Duration::from_millis(200),
                Duration::from_secs(1),
                Duration::from_secs(3),
            ],
        })
    }

    /// Override the delays between retries; an empty list disables retrying.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mysfit_url(&self, mysfit_id: &MysfitId) -> String {
        format!("{}/mysfits/{mysfit_id}", self.base_url)
    }

    async fn get_mysfit(&self, mysfit_id: &MysfitId) -> Result<MysfitProfile, LookupError> {
        let resp = self
            .http
            .get(self.mysfit_url(mysfit_id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(mysfit_id.to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        resp.json().await.map_err(LookupError::Decode)
    }
}

#[async_trait]
impl MysfitLookup for MysfitsApiClient {
    /// Fetch with retry; not-found, unreadable bodies and other client errors
    /// are returned at once.
    async fn fetch_mysfit(&self, mysfit_id: &MysfitId) -> Result<MysfitProfile, LookupError> {
        let mut attempt = 0;

        loop {
            match self.get_mysfit(mysfit_id).await {
                Ok(profile) => {
                    if attempt > 0 {
                        info!(attempt, mysfit_id = %mysfit_id, "mysfit lookup succeeded after retry");
                    }
                    return Ok(profile);
                }
                Err(e) if e.is_retryable() && attempt < self.retry_delays.len() => {
                    let delay = self.retry_delays[attempt];
                    attempt += 1;
                    warn!(
                        attempt,
                        mysfit_id = %mysfit_id,
                        error = %e,
                        "mysfit lookup failed, retrying after {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{StatusCode, Uri};
    use axum::response::{IntoResponse, Response};

    use super::*;

    const EVANGELINE: &str = "4e53920c-505a-4a90-a694-b9300791f0ae";

    #[derive(Clone, Copy)]
    enum Reply {
        Profile,
        Garbage,
        Status(StatusCode),
    }

    struct Script {
        replies: Vec<Reply>,
        hits: AtomicUsize,
        paths: Mutex<Vec<String>>,
    }

    fn profile() -> MysfitProfile {
        MysfitProfile {
            mysfit_id: EVANGELINE.into(),
            name: "Evangeline".into(),
            species: "Chimera".into(),
            age: 43,
            description: "d".into(),
            good_evil: "Evil".into(),
            law_chaos: "Lawful".into(),
            thumb_image_uri: "t".into(),
            profile_image_uri: "p".into(),
            likes: 0,
            adopted: false,
        }
    }

    async fn reply(State(script): State<Arc<Script>>, uri: Uri) -> Response {
        let n = script.hits.fetch_add(1, Ordering::SeqCst);
        script.paths.lock().unwrap().push(uri.path().to_string());
        match script.replies[n.min(script.replies.len() - 1)] {
            Reply::Profile => axum::Json(profile()).into_response(),
            Reply::Garbage => (StatusCode::OK, "[1, 2, 3]").into_response(),
            Reply::Status(status) => status.into_response(),
        }
    }

    /// Serve `replies` in order (repeating the last) on a local port.
    async fn api(replies: Vec<Reply>) -> (MysfitsApiClient, Arc<Script>) {
        let script = Arc::new(Script {
            replies,
            hits: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(reply).with_state(script.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = MysfitsApiClient::new(format!("http://{addr}/prod/"))
            .unwrap()
            .with_retry_delays(vec![Duration::ZERO; 3]);
        (client, script)
    }

    fn id() -> MysfitId {
        MysfitId::new(EVANGELINE).unwrap()
    }

    #[test]
    fn builds_lookup_url() {
        let client = MysfitsApiClient::new("https://api.example.com/prod/").unwrap();
        assert_eq!(
            client.mysfit_url(&id()),
            "https://api.example.com/prod/mysfits/4e53920c-505a-4a90-a694-b9300791f0ae"
        );
    }

    #[test]
    fn retryable_errors() {
        assert!(LookupError::Status(reqwest::StatusCode::BAD_GATEWAY).is_retryable());
        assert!(LookupError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!LookupError::Status(reqwest::StatusCode::BAD_REQUEST).is_retryable());
        assert!(!LookupError::NotFound("x".into()).is_retryable());
    }

    #[tokio::test]
    async fn fetches_profile_from_api_path() {
        let (client, script) = api(vec![Reply::Profile]).await;

        let fetched = client.fetch_mysfit(&id()).await.unwrap();

        assert_eq!(fetched, profile());
        assert_eq!(*script.paths.lock().unwrap(), vec![format!("/prod/mysfits/{EVANGELINE}")]);
    }

    #[tokio::test]
    async fn retries_server_errors_three_times() {
        let (client, script) = api(vec![Reply::Status(StatusCode::SERVICE_UNAVAILABLE)]).await;

        let err = client.fetch_mysfit(&id()).await.unwrap_err();

        assert!(matches!(err, LookupError::Status(s) if s == reqwest::StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(script.hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let (client, script) = api(vec![
            Reply::Status(StatusCode::BAD_GATEWAY),
            Reply::Status(StatusCode::TOO_MANY_REQUESTS),
            Reply::Profile,
        ])
        .await;

        assert!(client.fetch_mysfit(&id()).await.is_ok());
        assert_eq!(script.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let (client, script) = api(vec![Reply::Status(StatusCode::NOT_FOUND)]).await;

        let err = client.fetch_mysfit(&id()).await.unwrap_err();

        assert!(matches!(err, LookupError::NotFound(_)));
        assert_eq!(script.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreadable_body_is_not_retried() {
        let (client, script) = api(vec![Reply::Garbage, Reply::Profile]).await;

        let err = client.fetch_mysfit(&id()).await.unwrap_err();

        assert!(matches!(err, LookupError::Decode(_)));
        assert_eq!(script.hits.load(Ordering::SeqCst), 1);
    }
}
