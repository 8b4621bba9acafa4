use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::domain::{Creature, CreatureId, Trainer, TrainerId};
use tokio::sync::{Mutex, Semaphore};

use crate::{
    error::{StoreError, StoreOperation},
    store::RemoteStore,
};

pub fn creature(id: i64, nickname: &str, species: &str) -> Creature {
    Creature {
        id: CreatureId(id),
        nickname: nickname.to_string(),
        species: species.to_string(),
        trainer_id: None,
    }
}

pub fn trainer(id: i64, name: &str, creatures: Vec<Creature>) -> Trainer {
    Trainer {
        id: TrainerId(id),
        name: name.to_string(),
        creatures,
    }
}

pub fn ash() -> Trainer {
    trainer(1, "Ash", vec![creature(10, "Pika", "Pikachu")])
}

pub fn full_roster(id: i64, name: &str) -> Trainer {
    let creatures = (0..6)
        .map(|n| creature(id * 100 + n, &format!("Mon{n}"), "Rattata"))
        .collect();
    trainer(id, name, creatures)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    List,
    Delete(CreatureId),
    Create(TrainerId),
}

/// In-memory store that records calls. Every created creature is a
/// "Squirt (Squirtle)" with a fresh id starting at 11.
#[derive(Default)]
pub struct ScriptedStore {
    trainers: Vec<Trainer>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    failing: bool,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedStore {
    pub fn new(trainers: Vec<Trainer>) -> Self {
        Self {
            trainers,
            next_id: AtomicI64::new(11),
            ..Self::default()
        }
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Mutating calls wait for a permit on `gate` before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }

    fn check(&self, operation: StoreOperation) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Status {
                operation,
                url: "http://store.test".to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for ScriptedStore {
    async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
        self.record(Call::List).await;
        self.check(StoreOperation::ListTrainers)?;
        Ok(self.trainers.clone())
    }

    async fn delete_creature(&self, id: CreatureId) -> Result<(), StoreError> {
        self.record(Call::Delete(id)).await;
        self.wait_for_gate().await;
        self.check(StoreOperation::DeleteCreature)
    }

    async fn create_creature(&self, trainer_id: TrainerId) -> Result<Creature, StoreError> {
        self.record(Call::Create(trainer_id)).await;
        self.wait_for_gate().await;
        self.check(StoreOperation::CreateCreature)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Creature {
            trainer_id: Some(trainer_id),
            ..creature(id, "Squirt", "Squirtle")
        })
    }
}
