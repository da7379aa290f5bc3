use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::model::{AlignmentFilter, Mysfit, MysfitId, Question};

/// Persistence operations behind the mysfits API.
#[async_trait]
pub trait MysfitStore: Send + Sync {
    /// Every mysfit in the catalog.
    async fn list_mysfits(&self) -> Result<Vec<Mysfit>, CoreError>;

    /// Mysfits whose attribute on `filter.axis` equals `filter.value`.
    async fn list_by_alignment(&self, filter: &AlignmentFilter) -> Result<Vec<Mysfit>, CoreError>;

    /// A single mysfit, or `CoreError::NotFound`.
    async fn get_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError>;

    /// Add exactly one like. Never creates a record.
    async fn like_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError>;

    /// Mark as adopted. Never creates a record.
    async fn adopt_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError>;

    /// Unconditional write, used when seeding the catalog.
    async fn put_mysfit(&self, mysfit: &Mysfit) -> Result<(), CoreError>;
}

/// Persistence for customer questions.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn put_question(&self, question: &Question) -> Result<(), CoreError>;
}

/// In-process store for local runs and tests.
///
/// Mysfits are keyed by id, so listings come back ordered by `MysfitId`.
#[derive(Default)]
pub struct MemoryStore {
    mysfits: RwLock<BTreeMap<String, Mysfit>>,
    questions: RwLock<Vec<Question>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `mysfits`.
    pub fn with_mysfits(mysfits: impl IntoIterator<Item = Mysfit>) -> Self {
        let map = mysfits
            .into_iter()
            .map(|m| (m.mysfit_id.clone(), m))
            .collect();
        Self {
            mysfits: RwLock::new(map),
            questions: RwLock::new(Vec::new()),
        }
    }

    /// Questions received so far, oldest first.
    pub async fn questions(&self) -> Vec<Question> {
        self.questions.read().await.clone()
    }

    async fn update<F>(&self, id: &MysfitId, mutate: F) -> Result<Mysfit, CoreError>
    where
        F: FnOnce(&mut Mysfit) + Send,
    {
        let mut mysfits = self.mysfits.write().await;
        let mysfit = mysfits
            .get_mut(&id.to_string())
            .ok_or_else(|| CoreError::mysfit_not_found(id))?;
        mutate(mysfit);
        Ok(mysfit.clone())
    }
}

#[async_trait]
impl MysfitStore for MemoryStore {
    async fn list_mysfits(&self) -> Result<Vec<Mysfit>, CoreError> {
        Ok(self.mysfits.read().await.values().cloned().collect())
    }

    async fn list_by_alignment(&self, filter: &AlignmentFilter) -> Result<Vec<Mysfit>, CoreError> {
        Ok(self
            .mysfits
            .read()
            .await
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn get_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError> {
        self.mysfits
            .read()
            .await
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| CoreError::mysfit_not_found(id))
    }

    async fn like_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError> {
        self.update(id, |m| m.likes += 1).await
    }

    async fn adopt_mysfit(&self, id: &MysfitId) -> Result<Mysfit, CoreError> {
        self.update(id, |m| m.adopted = true).await
    }

    async fn put_mysfit(&self, mysfit: &Mysfit) -> Result<(), CoreError> {
        self.mysfits
            .write()
            .await
            .insert(mysfit.mysfit_id.clone(), mysfit.clone());
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn put_question(&self, question: &Question) -> Result<(), CoreError> {
        self.questions.write().await.push(question.clone());
        Ok(())
    }
}
