use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use mysfits_core::DynamoStore;
use mysfits_lambdas::{config, intake, telemetry};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let table = config::with_default("QUESTIONS_TABLE", "MysfitsQuestionsTable");
    let store = DynamoStore::new(&table).await;
    tracing::info!(table = %store.table_name(), "questions-intake starting");

    let store = &store;
    run(service_fn(
        move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
            Ok::<_, Error>(intake::submit_question(event.payload, store).await)
        },
    ))
    .await
}
