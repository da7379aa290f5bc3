use aws_config::BehaviorVersion;
use aws_lambda_events::event::dynamodb::Event;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use mysfits_lambdas::notify::{self, SnsNotifier};
use mysfits_lambdas::{config, telemetry};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let topic_arn = config::required("SNS_TOPIC_ARN")?;
    let aws = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let notifier = SnsNotifier::new(aws_sdk_sns::Client::new(&aws), topic_arn);
    tracing::info!(topic = %notifier.topic_arn(), "questions-notifier starting");

    let notifier = &notifier;
    run(service_fn(
        move |event: LambdaEvent<Event>| async move {
            let published = notify::process_stream(event.payload, notifier).await?;
            Ok::<_, Error>(serde_json::json!({ "published": published }))
        },
    ))
    .await
}
