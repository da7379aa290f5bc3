use thiserror::Error;

/// Core errors for the mysfits services.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("DynamoDB error: {0}")]
    Dynamo(#[from] aws_sdk_dynamodb::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_dynamo::Error),

    #[error("Mysfit id validation error: {0}")]
    MysfitId(#[from] crate::model::MysfitIdError),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CoreError {
    pub(crate) fn mysfit_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("mysfit {id} does not exist"))
    }
}
