//! Question Store Adapter: the trait the orchestrator depends on, plus
//! an in-memory fake used by tests and the CLI's local dev loop.
//!
//! Grounded on `question.service.go`'s `CreateQuestion` /
//! `GetQuestionByID` / `GetAllQuestions` / `UpdateQuestion` /
//! `DeleteQuestion`: the method set and the `ValidationError` message
//! text are carried over so a real (e.g. Mongo-backed) adapter can be
//! dropped in behind this trait unchanged. A persistent adapter is out
//! of scope for this crate (spec §1); only the trait and a fake live
//! here.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Question, Test};

/// CRUD over the question catalog.
///
/// `create` enforces the creation invariant (non-empty title/description,
/// a positive level, at least one test) via [`Question::new`] and
/// surfaces [`Error::Validation`] unchanged when it is violated. All
/// other methods pass through store-level errors unchanged.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn create(
        &self,
        title: String,
        description: String,
        level: u32,
        tests: Vec<Test>,
        input_types: String,
        output_type: String,
    ) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Question>;

    async fn list(&self) -> Result<Vec<Question>>;

    async fn update(
        &self,
        id: &str,
        title: String,
        description: String,
        level: u32,
        tests: Vec<Test>,
        input_types: String,
        output_type: String,
    ) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// An in-memory [`QuestionStore`], keyed by a freshly generated id.
///
/// Used by the test suite and the CLI's local dev loop in place of a
/// real document store; the orchestrator depends only on the trait, so
/// a Mongo-backed adapter is a drop-in replacement.
#[derive(Default)]
pub struct InMemoryQuestionStore {
    questions: RwLock<HashMap<String, Question>>,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn create(
        &self,
        title: String,
        description: String,
        level: u32,
        tests: Vec<Test>,
        input_types: String,
        output_type: String,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let question = Question::new(id.clone(), title, description, level, tests, input_types, output_type)?;
        self.questions.write().unwrap().insert(id.clone(), question);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Question> {
        self.questions
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<Question>> {
        Ok(self.questions.read().unwrap().values().cloned().collect())
    }

    async fn update(
        &self,
        id: &str,
        title: String,
        description: String,
        level: u32,
        tests: Vec<Test>,
        input_types: String,
        output_type: String,
    ) -> Result<()> {
        let mut questions = self.questions.write().unwrap();
        if !questions.contains_key(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let updated = Question::new(id.to_string(), title, description, level, tests, input_types, output_type)?;
        questions.insert(id.to_string(), updated);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.questions.write().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tests() -> Vec<Test> {
        vec![Test::new("[1,2,3]", "6")]
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryQuestionStore::new();
        let id = store
            .create(
                "Sum".to_string(),
                "Sum an array".to_string(),
                1,
                sample_tests(),
                "int[]".to_string(),
                "int".to_string(),
            )
            .await
            .unwrap();
        let question = store.get(&id).await.unwrap();
        assert_eq!(question.title, "Sum");
        assert_eq!(question.tests.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_empty_title() {
        let store = InMemoryQuestionStore::new();
        let err = store
            .create(
                String::new(),
                "d".to_string(),
                1,
                sample_tests(),
                String::new(),
                String::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation));
    }

    #[tokio::test]
    async fn create_rejects_zero_level() {
        let store = InMemoryQuestionStore::new();
        let err = store
            .create(
                "t".to_string(),
                "d".to_string(),
                0,
                sample_tests(),
                String::new(),
                String::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation));
    }

    #[tokio::test]
    async fn create_rejects_empty_tests() {
        let store = InMemoryQuestionStore::new();
        let err = store
            .create(
                "t".to_string(),
                "d".to_string(),
                1,
                Vec::new(),
                String::new(),
                String::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = InMemoryQuestionStore::new();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = InMemoryQuestionStore::new();
        assert!(matches!(
            store.delete("nope").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn list_reflects_all_created_questions() {
        let store = InMemoryQuestionStore::new();
        store
            .create("a".into(), "d".into(), 1, sample_tests(), "".into(), "".into())
            .await
            .unwrap();
        store
            .create("b".into(), "d".into(), 1, sample_tests(), "".into(), "".into())
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let store = InMemoryQuestionStore::new();
        let id = store
            .create("a".into(), "d".into(), 1, sample_tests(), "".into(), "".into())
            .await
            .unwrap();
        store
            .update(&id, "b".into(), "d2".into(), 2, sample_tests(), "".into(), "".into())
            .await
            .unwrap();
        let question = store.get(&id).await.unwrap();
        assert_eq!(question.title, "b");
        assert_eq!(question.level, 2);
    }
}
