use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue};
use mysfits_core::{Question, QuestionStore};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::IntakeError;

/// Body of `POST /questions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSubmission {
    #[serde(alias = "text", alias = "Text", alias = "QuestionText")]
    pub question_text: Option<String>,
    #[serde(alias = "email", alias = "EmailAddress", alias = "UserEmailAddress")]
    pub email_address: Option<String>,
}

impl QuestionSubmission {
    /// Validate and turn into a storable question.
    pub fn into_question(self, question_id: String, submitted_at: i64) -> Result<Question, IntakeError> {
        let text = self
            .question_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(IntakeError::Invalid("questionText must not be empty"))?;

        let email = self
            .email_address
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(IntakeError::Invalid("emailAddress must not be empty"))?;

        if !looks_like_email(&email) {
            return Err(IntakeError::Invalid("emailAddress is not a valid email address"));
        }

        Ok(Question {
            question_id,
            question_text: text,
            user_email_address: email,
            submitted_at,
        })
    }
}

/// One `@` with something on each side, and no whitespace or control
/// characters (the address ends up in an SNS subject).
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn parse_submission(request: &ApiGatewayProxyRequest) -> Result<QuestionSubmission, IntakeError> {
    let body = request
        .body
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .ok_or(IntakeError::MissingBody)?;

    if request.is_base64_encoded {
        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|_| IntakeError::BadEncoding)?;
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        Ok(serde_json::from_str(body)?)
    }
}

fn response(status_code: i64, body: serde_json::Value) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*"));

    let mut response = ApiGatewayProxyResponse::default();
    response.status_code = status_code;
    response.headers = headers;
    response.body = Some(Body::Text(body.to_string()));
    response
}

/// Handle `POST /questions`: validate, assign an id and store the question.
///
/// Always answers with a proxy response; client errors are 400, store
/// failures 500.
pub async fn submit_question<S>(request: ApiGatewayProxyRequest, store: &S) -> ApiGatewayProxyResponse
where
    S: QuestionStore + ?Sized,
{
    let request_id = request
        .request_context
        .request_id
        .clone()
        .unwrap_or_else(|| "-".to_string());
    info!(request_id = %request_id, "processing question submission");

    let question = match parse_submission(&request).and_then(|submission| {
        submission.into_question(Uuid::new_v4().to_string(), Utc::now().timestamp())
    }) {
        Ok(question) => question,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "rejected question submission");
            return response(400, serde_json::json!({ "error": e.to_string() }));
        }
    };

    if let Err(e) = store.put_question(&question).await.map_err(IntakeError::from) {
        error!(request_id = %request_id, error = %e, "failed to store question");
        return response(500, serde_json::json!({ "error": "Internal server error" }));
    }

    info!(
        request_id = %request_id,
        question_id = %question.question_id,
        "question stored"
    );
    response(200, serde_json::json!({ "questionId": question.question_id }))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mysfits_core::{CoreError, MemoryStore};

    use super::*;

    struct FailingStore;

    #[async_trait]
    impl QuestionStore for FailingStore {
        async fn put_question(&self, _question: &Question) -> Result<(), CoreError> {
            Err(CoreError::NotFound("table MysfitsQuestionsTable".into()))
        }
    }

    fn request(body: Option<&str>) -> ApiGatewayProxyRequest {
        let mut request = ApiGatewayProxyRequest::default();
        request.http_method = http::Method::POST;
        request.path = Some("/questions".into());
        request.body = body.map(String::from);
        request.request_context.request_id = Some("req-1".into());
        request
    }

    fn body(response: &ApiGatewayProxyResponse) -> serde_json::Value {
        match &response.body {
            Some(Body::Text(text)) => serde_json::from_str(text).unwrap(),
            other => panic!("expected a text body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stores_valid_question() {
        let store = MemoryStore::new();
        let resp = submit_question(
            request(Some(r#"{"questionText":"Do mysfits sleep?","emailAddress":"fan@example.com"}"#)),
            &store,
        )
        .await;

        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.headers["access-control-allow-origin"], "*");
        assert_eq!(resp.headers["access-control-allow-methods"], "*");
        assert_eq!(resp.headers["content-type"], "application/json");

        let questions = store.questions().await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "Do mysfits sleep?");
        assert_eq!(questions[0].user_email_address, "fan@example.com");
        assert_eq!(body(&resp)["questionId"], questions[0].question_id.as_str());
        assert!(Uuid::parse_str(&questions[0].question_id).is_ok());
    }

    #[tokio::test]
    async fn accepts_short_field_names_and_base64() {
        let store = MemoryStore::new();
        let mut req = request(Some(
            STANDARD
                .encode(r#"{"text":"Hello?","email":"a@b.example"}"#)
                .as_str(),
        ));
        req.is_base64_encoded = true;

        let resp = submit_question(req, &store).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(store.questions().await[0].question_text, "Hello?");
    }

    #[tokio::test]
    async fn rejects_missing_body() {
        let store = MemoryStore::new();
        let resp = submit_question(request(None), &store).await;
        assert_eq!(resp.status_code, 400);
        assert!(body(&resp)["error"].is_string());
        assert!(store.questions().await.is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let store = MemoryStore::new();
        for payload in [
            r#"{"questionText":"  ","emailAddress":"fan@example.com"}"#,
            r#"{"questionText":"Hi","emailAddress":"not-an-email"}"#,
            r#"{"questionText":"Hi"}"#,
            "not json",
        ] {
            let resp = submit_question(request(Some(payload)), &store).await;
            assert_eq!(resp.status_code, 400, "payload {payload}");
        }
        assert!(store.questions().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let resp = submit_question(
            request(Some(r#"{"questionText":"Hi","emailAddress":"fan@example.com"}"#)),
            &FailingStore,
        )
        .await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(body(&resp)["error"], "Internal server error");
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("fan@example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("fan@"));
        assert!(!looks_like_email("a@b@c"));
        assert!(!looks_like_email("fan @example.com"));
        assert!(!looks_like_email("fan@example.com\nBcc: x"));
        assert!(!looks_like_email("fan@exa\tmple.com"));
        assert!(!looks_like_email("fan@example.com\u{7}"));
    }

    #[tokio::test]
    async fn rejects_email_with_line_break() {
        let store = MemoryStore::new();
        let resp = submit_question(
            request(Some(r#"{"questionText":"Hi","emailAddress":"fan@example.com\nBcc: x@y.z"}"#)),
            &store,
        )
        .await;

        assert_eq!(resp.status_code, 400);
        assert_eq!(body(&resp)["error"], "emailAddress is not a valid email address");
        assert!(store.questions().await.is_empty());
    }
}
