//! Remote store seam and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Creature, CreatureId, Trainer, TrainerId},
    protocol::CreateCreatureRequest,
};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreOperation};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError>;
    async fn delete_creature(&self, id: CreatureId) -> Result<(), StoreError>;
    async fn create_creature(&self, trainer_id: TrainerId) -> Result<Creature, StoreError>;
}

/// Talks to the trainer backend. One attempt per call: no retries, no
/// timeouts beyond what the transport imposes.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    http: Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn trainers_url(&self) -> String {
        format!("{}/trainers", self.base_url)
    }

    fn creatures_url(&self) -> String {
        format!("{}/pokemons/", self.base_url)
    }

    async fn send(
        &self,
        operation: StoreOperation,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        debug!(operation = operation.as_str(), url, "store request");
        let response = request.send().await.map_err(|source| StoreError::Transport {
            operation,
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                operation,
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        operation: StoreOperation,
        url: &str,
        response: Response,
    ) -> Result<T, StoreError> {
        response.json().await.map_err(|source| StoreError::Decode {
            operation,
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
        let operation = StoreOperation::ListTrainers;
        let url = self.trainers_url();
        let response = self.send(operation, &url, self.http.get(&url)).await?;
        Self::decode(operation, &url, response).await
    }

    async fn post_creature(&self, trainer_id: TrainerId) -> Result<Creature, StoreError> {
        let operation = StoreOperation::CreateCreature;
        let url = self.creatures_url();
        let request = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&CreateCreatureRequest { trainer_id });
        let response = self.send(operation, &url, request).await?;
        Self::decode(operation, &url, response).await
    }
}

/// The single diagnostic sink for store failures.
fn report<T>(result: &Result<T, StoreError>) {
    if let Err(err) = result {
        warn!(
            operation = err.operation().as_str(),
            error = %err,
            "something went wrong, is the trainer server up?"
        );
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
        let result = self.fetch_trainers().await;
        report(&result);
        result
    }

    async fn delete_creature(&self, id: CreatureId) -> Result<(), StoreError> {
        let url = format!("{}{id}", self.creatures_url());
        let result = self
            .send(StoreOperation::DeleteCreature, &url, self.http.delete(&url))
            .await
            .map(|_| ());
        report(&result);
        result
    }

    async fn create_creature(&self, trainer_id: TrainerId) -> Result<Creature, StoreError> {
        let result = self.post_creature(trainer_id).await;
        report(&result);
        result
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
