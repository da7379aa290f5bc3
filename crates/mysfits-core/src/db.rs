use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{AlignmentFilter, Mysfit, MysfitId, Question};
use crate::store::{MysfitStore, QuestionStore};

type Item = HashMap<String, AttributeValue>;

/// Hash key of the mysfits table.
const MYSFIT_KEY: &str = "MysfitId";

/// DynamoDB client wrapper bound to a single table.
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    /// Create a new `DynamoStore` by loading AWS configuration from the
    /// environment and constructing a DynamoDB client.
    pub async fn new(table_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::with_client(Client::new(&config), table_name)
    }

    /// Create a store around an existing client.
    pub fn with_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// The DynamoDB table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key(id: &MysfitId) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }

    async fn update_existing(
        &self,
        id: &MysfitId,
        update_expression: &str,
        value_name: &str,
        value: AttributeValue,
    ) -> Result<Mysfit, CoreError> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(MYSFIT_KEY, Self::key(id))
            .update_expression(update_expression)
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", MYSFIT_KEY)
            .expression_attribute_values(value_name, value)
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|err| map_update_error(err, id))?;

        let attributes = output
            .attributes
            .ok_or_else(|| CoreError::mysfit_not_found(id))?;
        Ok(serde_dynamo::from_item(attributes)?)
    }
}

/// A failed `attribute_exists` condition means the mysfit is missing.
fn map_update_error<R>(err: SdkError<UpdateItemError, R>, id: &MysfitId) -> CoreError
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let missing = err
        .as_service_error()
        .is_some_and(|e| e.is_conditional_check_failed_exception());

    if missing {
        CoreError::mysfit_not_found(id)
    } else {
        CoreError::Dynamo(aws_sdk_dynamodb::Error::from(err))
    }
}

#[async_trait]
impl MysfitStore for DynamoStore {
    async fn list_mysfits(&self) -> Result<Vec<Mysfit>, CoreError> {
        let mut mysfits = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)?;

            let page: Vec<Mysfit> = serde_dynamo::from_items(output.items.unwrap_or_default())?;
            debug!(table = %self.table_name, count = page.len(), "scanned page");
            mysfits.extend(page);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(mysfits)
    }

    async fn list_by_alignment(&self, filter: &AlignmentFilter) -> Result<Vec<Mysfit>, CoreError> {
        let mut mysfits = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(filter.axis.index_name())
                .key_condition_expression("#axis = :value")
                .expression_attribute_names("#axis", filter.axis.attribute_name())
                .expression_attribute_values(":value", AttributeValue::S(filter.value.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)?;

            let page: Vec<Mysfit> = serde_dynamo::from_items(output.items.unwrap_or_default())?;
            debug!(
                index = filter.axis.index_name(),
                value = %filter.value,
                count = page.len(),
                "queried page"
            );
            mysfits.extend(page);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(mysfits)
    }

    async fn get_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(MYSFIT_KEY, Self::key(id))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        let item = output.item.ok_or_else(|| CoreError::mysfit_not_found(id))?;
        Ok(serde_dynamo::from_item(item)?)
    }

    async fn like_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError> {
        self.update_existing(
            id,
            "ADD Likes :one",
            ":one",
            AttributeValue::N("1".to_string()),
        )
        .await
    }

    async fn adopt_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError> {
        self.update_existing(
            id,
            "SET Adopted = :adopted",
            ":adopted",
            AttributeValue::Bool(true),
        )
        .await
    }

    async fn put_mysfit(&self, mysfit: &Mysfit) -> Result<(), CoreError> {
        let item: Item = serde_dynamo::to_item(mysfit)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(())
    }
}

#[async_trait]
impl QuestionStore for DynamoStore {
    async fn put_question(&self, question: &Question) -> Result<(), CoreError> {
        let item: Item = serde_dynamo::to_item(question)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysfit_item_round_trips_through_attribute_values() {
        let mysfit = Mysfit {
            mysfit_id: "4e53920c-505a-4a90-a694-b9300791f0ae".into(),
            name: "Evangeline".into(),
            species: "Chimera".into(),
            age: 43,
            description: "A playful chimera.".into(),
            good_evil: "Evil".into(),
            law_chaos: "Lawful".into(),
            thumb_image_uri: "thumb".into(),
            profile_image_uri: "profile".into(),
            likes: 12,
            adopted: true,
        };

        let item: Item = serde_dynamo::to_item(&mysfit).unwrap();
        assert_eq!(
            item.get("MysfitId"),
            Some(&AttributeValue::S("4e53920c-505a-4a90-a694-b9300791f0ae".into()))
        );
        assert_eq!(item.get("Likes"), Some(&AttributeValue::N("12".into())));
        assert_eq!(item.get("Adopted"), Some(&AttributeValue::Bool(true)));

        let back: Mysfit = serde_dynamo::from_item(item).unwrap();
        assert_eq!(back, mysfit);
    }

    #[test]
    fn question_item_uses_table_attribute_names() {
        let question = Question {
            question_id: "q-1".into(),
            question_text: "Can I adopt two?".into(),
            user_email_address: "fan@example.com".into(),
            submitted_at: 1_700_000_000,
        };

        let item: Item = serde_dynamo::to_item(&question).unwrap();
        assert!(item.contains_key("QuestionId"));
        assert!(item.contains_key("QuestionText"));
        assert!(item.contains_key("UserEmailAddress"));
        assert_eq!(
            item.get("SubmittedAt"),
            Some(&AttributeValue::N("1700000000".into()))
        );
    }
}
