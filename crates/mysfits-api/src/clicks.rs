use async_trait::async_trait;
use aws_sdk_firehose::Client;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record;
use mysfits_core::ClickEvent;
use tracing::info;

/// Errors forwarding a click.
#[derive(Debug, thiserror::Error)]
pub enum ClickSinkError {
    #[error("Firehose error: {0}")]
    Firehose(#[from] aws_sdk_firehose::Error),

    #[error("Firehose record error: {0}")]
    Build(#[from] aws_sdk_firehose::error::BuildError),

    #[error("click encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for profile clicks.
#[async_trait]
pub trait ClickSink: Send + Sync {
    async fn record_click(&self, click: &ClickEvent) -> Result<(), ClickSinkError>;
}

/// Forwards clicks to a Kinesis Firehose delivery stream, one JSON line per record.
pub struct FirehoseClickSink {
    client: Client,
    delivery_stream: String,
}

impl FirehoseClickSink {
    pub fn new(client: Client, delivery_stream: impl Into<String>) -> Self {
        Self {
            client,
            delivery_stream: delivery_stream.into(),
        }
    }
}

/// Newline-delimited JSON, as the delivery stream writes records back to back.
pub fn encode_click(click: &ClickEvent) -> Result<Vec<u8>, serde_json::Error> {
    let mut data = serde_json::to_vec(click)?;
    data.push(b'\n');
    Ok(data)
}

#[async_trait]
impl ClickSink for FirehoseClickSink {
    async fn record_click(&self, click: &ClickEvent) -> Result<(), ClickSinkError> {
        let record = Record::builder()
            .data(Blob::new(encode_click(click)?))
            .build()?;

        let output = self
            .client
            .put_record()
            .delivery_stream_name(&self.delivery_stream)
            .record(record)
            .send()
            .await
            .map_err(aws_sdk_firehose::Error::from)?;

        info!(
            stream = %self.delivery_stream,
            record_id = output.record_id(),
            mysfit_id = %click.mysfit_id,
            "click forwarded"
        );
        Ok(())
    }
}

/// Logs clicks when no delivery stream is configured.
pub struct LogClickSink;

#[async_trait]
impl ClickSink for LogClickSink {
    async fn record_click(&self, click: &ClickEvent) -> Result<(), ClickSinkError> {
        info!(mysfit_id = %click.mysfit_id, user_id = %click.user_id, "click received");
        Ok(())
    }
}
