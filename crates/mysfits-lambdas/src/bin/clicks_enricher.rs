use aws_lambda_events::event::firehose::KinesisFirehoseEvent;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use mysfits_lambdas::api_client::MysfitsApiClient;
use mysfits_lambdas::{config, enrich, telemetry};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let api_url = config::required("MYSFITS_API_URL")?;
    let client = MysfitsApiClient::new(api_url)?;
    tracing::info!(api = %client.base_url(), "clicks-enricher starting");

    let client = &client;
    run(service_fn(
        move |event: LambdaEvent<KinesisFirehoseEvent>| async move {
            Ok::<_, Error>(enrich::transform_clicks(event.payload, client).await)
        },
    ))
    .await
}
