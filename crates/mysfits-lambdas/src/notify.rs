use async_trait::async_trait;
use aws_lambda_events::event::dynamodb::{Event, EventRecord};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::NotifyError;
use crate::notifications;

/// Destination for question notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish one message, returning its message id.
    async fn publish(&self, subject: &str, message: &str) -> Result<String, NotifyError>;
}

/// Publishes to an SNS topic the site operators subscribe to.
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<String, NotifyError> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| NotifyError::Publish(aws_sdk_sns::Error::from(e).to_string()))?;

        Ok(output.message_id().unwrap_or("missing id").to_string())
    }
}

/// The question attributes read from a stream record's `NewImage`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QuestionImage {
    question_text: Option<String>,
    user_email_address: Option<String>,
}

/// Build the (subject, message) pair for an inserted question.
fn question_notification(record: &EventRecord) -> Result<(String, String), NotifyError> {
    let image: QuestionImage = serde_dynamo::from_item(record.change.new_image.clone())
        .map_err(|source| NotifyError::Image {
            record: record.event_id.clone(),
            source,
        })?;

    let missing = |attribute| NotifyError::MissingAttribute {
        record: record.event_id.clone(),
        attribute,
    };
    let text = image.question_text.ok_or_else(|| missing("QuestionText"))?;
    let email = image
        .user_email_address
        .ok_or_else(|| missing("UserEmailAddress"))?;

    Ok((
        notifications::format_subject(&email),
        notifications::format_message(&email, &text),
    ))
}

/// Notify about every question inserted in a stream batch.
///
/// Non-INSERT records are skipped. A record whose image lacks the question
/// attributes fails the whole batch so the stream retries it; a failed
/// publish is logged and the batch carries on.
///
/// Returns how many notifications were published.
pub async fn process_stream<N>(event: Event, notifier: &N) -> Result<usize, NotifyError>
where
    N: Notifier + ?Sized,
{
    info!(records = event.records.len(), "processing question stream batch");

    let mut published = 0;
    for record in &event.records {
        let record_id = record.event_id.as_str();

        if record.event_name != "INSERT" {
            info!(
                record_id,
                event_name = %record.event_name,
                "skipping non-insert record"
            );
            continue;
        }

        let (subject, message) = question_notification(record)?;
        match notifier.publish(&subject, &message).await {
            Ok(message_id) => {
                published += 1;
                info!(record_id, message_id = %message_id, "question notification sent");
            }
            Err(e) => {
                warn!(record_id, error = %e, "failed to send question notification");
            }
        }
    }

    info!(published, "question stream batch complete");
    Ok(published)
}
