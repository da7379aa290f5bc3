use aws_lambda_events::event::firehose::{
    KinesisFirehoseEvent, KinesisFirehoseEventRecord, KinesisFirehoseResponse,
    KinesisFirehoseResponseRecord,
};
use mysfits_core::{ClickEvent, EnrichedClick, MysfitId};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api_client::MysfitLookup;

/// Outcome Firehose expects for each transformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformResult {
    Ok,
    Dropped,
    ProcessingFailed,
}

impl TransformResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Dropped => "Dropped",
            Self::ProcessingFailed => "ProcessingFailed",
        }
    }
}

/// A click as it arrives; either field may be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClick {
    mysfit_id: Option<String>,
    user_id: Option<String>,
}

enum Decoded {
    Click(MysfitId, ClickEvent),
    /// Readable JSON that is not a usable click.
    Unusable(String),
    Unreadable(String),
}

fn decode_record(data: &[u8]) -> Decoded {
    let raw: RawClick = match serde_json::from_slice(data) {
        Ok(raw) => raw,
        Err(e) => return Decoded::Unreadable(format!("invalid JSON: {e}")),
    };

    let (mysfit_id, user_id) = match (raw.mysfit_id, raw.user_id) {
        (Some(m), Some(u)) if !m.trim().is_empty() && !u.trim().is_empty() => (m, u),
        _ => return Decoded::Unusable("missing mysfitId or userId".to_string()),
    };

    match MysfitId::new(&mysfit_id) {
        Ok(id) => Decoded::Click(
            id,
            ClickEvent {
                mysfit_id: id.to_string(),
                user_id,
            },
        ),
        Err(e) => Decoded::Unusable(e.to_string()),
    }
}

/// The enriched click as one JSON line.
pub fn encode_enriched(click: &EnrichedClick) -> Result<Vec<u8>, serde_json::Error> {
    let mut json = serde_json::to_vec(click)?;
    json.push(b'\n');
    Ok(json)
}

fn transformed(record_id: Option<String>, result: TransformResult, data: Vec<u8>) -> KinesisFirehoseResponseRecord {
    let mut out = KinesisFirehoseResponseRecord::default();
    out.record_id = record_id;
    out.result = Some(result.as_str().to_string());
    out.data.0 = data;
    out
}

/// Enrich every record of a Firehose transformation batch.
///
/// Each input record yields exactly one output record with the same id, in
/// input order.
pub async fn transform_clicks<L>(event: KinesisFirehoseEvent, lookup: &L) -> KinesisFirehoseResponse
where
    L: MysfitLookup + ?Sized,
{
    info!(
        invocation_id = event.invocation_id.as_deref().unwrap_or("-"),
        delivery_stream = event.delivery_stream_arn.as_deref().unwrap_or("-"),
        region = event.region.as_deref().unwrap_or("-"),
        records = event.records.len(),
        "transforming click batch"
    );

    let mut records = Vec::with_capacity(event.records.len());
    for record in event.records {
        records.push(transform_record(record, lookup).await);
    }

    let ok = records
        .iter()
        .filter(|r| r.result.as_deref() == Some(TransformResult::Ok.as_str()))
        .count();
    info!(ok, total = records.len(), "click batch transformed");

    let mut response = KinesisFirehoseResponse::default();
    response.records = records;
    response
}

async fn transform_record<L>(record: KinesisFirehoseEventRecord, lookup: &L) -> KinesisFirehoseResponseRecord
where
    L: MysfitLookup + ?Sized,
{
    let record_id = record.record_id;
    let data = record.data.0;
    let id_for_log = record_id.clone().unwrap_or_else(|| "-".to_string());

    let (mysfit_id, click) = match decode_record(&data) {
        Decoded::Click(id, click) => (id, click),
        Decoded::Unusable(reason) => {
            info!(record_id = %id_for_log, reason = %reason, "dropping unusable click");
            return transformed(record_id, TransformResult::Dropped, data);
        }
        Decoded::Unreadable(reason) => {
            warn!(record_id = %id_for_log, reason = %reason, "unreadable click record");
            return transformed(record_id, TransformResult::ProcessingFailed, data);
        }
    };

    let mysfit = match lookup.fetch_mysfit(&mysfit_id).await {
        Ok(mysfit) => mysfit,
        Err(e) => {
            warn!(
                record_id = %id_for_log,
                mysfit_id = %mysfit_id,
                error = %e,
                "mysfit lookup failed"
            );
            return transformed(record_id, TransformResult::ProcessingFailed, data);
        }
    };

    let enriched = EnrichedClick::new(&click, &mysfit);
    match encode_enriched(&enriched) {
        Ok(encoded) => {
            info!(record_id = %id_for_log, mysfit_id = %mysfit_id, "click enriched");
            transformed(record_id, TransformResult::Ok, encoded)
        }
        Err(e) => {
            warn!(record_id = %id_for_log, error = %e, "cannot encode enriched click");
            transformed(record_id, TransformResult::ProcessingFailed, data)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mysfits_core::MysfitProfile;

    use super::*;
    use crate::errors::LookupError;

    const EVANGELINE: &str = "4e53920c-505a-4a90-a694-b9300791f0ae";
    const FLAKY: &str = "2b473002-36f8-4b87-954e-9a377e0ccbec";

    struct FakeLookup {
        profiles: HashMap<String, MysfitProfile>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn new() -> Self {
            let profile = MysfitProfile {
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
            };
            Self {
                profiles: HashMap::from([(EVANGELINE.to_string(), profile)]),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MysfitLookup for FakeLookup {
        async fn fetch_mysfit(&self, mysfit_id: &MysfitId) -> Result<MysfitProfile, LookupError> {
            let key = mysfit_id.to_string();
            self.calls.lock().unwrap().push(key.clone());
            if key == FLAKY {
                return Err(LookupError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            self.profiles
                .get(&key)
                .cloned()
                .ok_or(LookupError::NotFound(key))
        }
    }

    /// A transformation event in the shape Firehose delivers it.
    fn event(records: &[(&str, &str)]) -> KinesisFirehoseEvent {
        let records: Vec<_> = records
            .iter()
            .map(|(id, payload)| {
                serde_json::json!({
                    "recordId": id,
                    "approximateArrivalTimestamp": 1_700_000_000_000i64,
                    "data": STANDARD.encode(payload)
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "invocationId": "inv-1",
            "deliveryStreamArn": "arn:aws:firehose:us-east-1:123456789012:deliverystream/clicks",
            "region": "us-east-1",
            "records": records
        }))
        .unwrap()
    }

    fn outcome(record: &KinesisFirehoseResponseRecord) -> (&str, &str) {
        (
            record.record_id.as_deref().unwrap(),
            record.result.as_deref().unwrap(),
        )
    }

    #[tokio::test]
    async fn enriches_known_mysfit() {
        let lookup = FakeLookup::new();
        let click = format!(r#"{{"mysfitId":"{EVANGELINE}","userId":"user-1"}}"#);

        let response = transform_clicks(event(&[("r-1", &click)]), &lookup).await;

        assert_eq!(response.records.len(), 1);
        let out = &response.records[0];
        assert_eq!(outcome(out), ("r-1", "Ok"));
        assert_eq!(out.data.0.last(), Some(&b'\n'));
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&out.data.0).unwrap(),
            serde_json::json!({
                "userId": "user-1",
                "mysfitId": EVANGELINE,
                "goodevil": "Evil",
                "lawchaos": "Lawful",
                "species": "Chimera"
            })
        );
    }

    #[tokio::test]
    async fn response_serializes_base64_data() {
        let lookup = FakeLookup::new();
        let click = format!(r#"{{"mysfitId":"{EVANGELINE}","userId":"user-1"}}"#);

        let response = transform_clicks(event(&[("r-1", &click)]), &lookup).await;
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["records"][0]["recordId"], "r-1");
        assert_eq!(json["records"][0]["result"], "Ok");
        let data = STANDARD
            .decode(json["records"][0]["data"].as_str().unwrap())
            .unwrap();
        assert_eq!(data, response.records[0].data.0);
    }

    #[tokio::test]
    async fn every_record_is_answered_in_order() {
        let lookup = FakeLookup::new();
        let good = format!(r#"{{"mysfitId":"{EVANGELINE}","userId":"user-1"}}"#);
        let unknown = r#"{"mysfitId":"00000000-0000-4000-8000-000000000000","userId":"u"}"#;
        let flaky = format!(r#"{{"mysfitId":"{FLAKY}","userId":"user-2"}}"#);

        let response = transform_clicks(
            event(&[
                ("r-1", &good),
                ("r-2", "not json"),
                ("r-3", r#"{"userId":"user-3"}"#),
                ("r-4", unknown),
                ("r-5", &flaky),
            ]),
            &lookup,
        )
        .await;

        let outcomes: Vec<_> = response.records.iter().map(outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                ("r-1", "Ok"),
                ("r-2", "ProcessingFailed"),
                ("r-3", "Dropped"),
                ("r-4", "ProcessingFailed"),
                ("r-5", "ProcessingFailed"),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_mysfit_id_is_dropped_without_lookup() {
        let lookup = FakeLookup::new();
        let click = r#"{"mysfitId":"../../admin?x=","userId":"user-1"}"#;

        let response = transform_clicks(event(&[("r-1", click)]), &lookup).await;

        assert_eq!(outcome(&response.records[0]), ("r-1", "Dropped"));
        assert_eq!(response.records[0].data.0, click.as_bytes());
        assert!(lookup.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookup_uses_canonical_id() {
        let lookup = FakeLookup::new();
        let click = format!(
            r#"{{"mysfitId":"{}","userId":"user-1"}}"#,
            EVANGELINE.to_uppercase()
        );

        let response = transform_clicks(event(&[("r-1", &click)]), &lookup).await;

        assert_eq!(outcome(&response.records[0]), ("r-1", "Ok"));
        assert_eq!(*lookup.calls.lock().unwrap(), vec![EVANGELINE.to_string()]);
    }

    #[tokio::test]
    async fn dropped_records_echo_original_data() {
        let lookup = FakeLookup::new();
        let payload = r#"{"mysfitId":""}"#;

        let response = transform_clicks(event(&[("r-1", payload)]), &lookup).await;

        assert_eq!(outcome(&response.records[0]), ("r-1", "Dropped"));
        assert_eq!(response.records[0].data.0, payload.as_bytes());
        assert!(lookup.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch() {
        let response = transform_clicks(event(&[]), &FakeLookup::new()).await;
        assert!(response.records.is_empty());
    }
}
