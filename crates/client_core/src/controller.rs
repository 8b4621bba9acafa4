//! Dispatches element activations to the remote store and applies the
//! completions to the view.

use std::sync::Arc;

use futures::future::join_all;
use shared::domain::{Creature, CreatureId, TrainerId};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    error::ActionError,
    store::RemoteStore,
    view::{Action, NodeId, Reservation, View},
    ROSTER_LIMIT,
};

#[derive(Debug)]
pub enum Outcome {
    Released {
        creature_id: CreatureId,
        entry: NodeId,
    },
    Added {
        trainer_id: TrainerId,
        creature: Creature,
        entry: NodeId,
    },
    Skipped(SkipReason),
    Failed(ActionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoAction(NodeId),
    RosterFull { trainer_id: TrainerId, size: usize },
    UnknownTrainer(TrainerId),
    EntryGone(CreatureId),
}

/// Holds no per-event state. The view lock is never held across a store
/// call, so independent activations race their own request and apply in
/// completion order.
#[derive(Clone)]
pub struct InteractionController {
    store: Arc<dyn RemoteStore>,
    view: Arc<Mutex<View>>,
}

impl InteractionController {
    pub(crate) fn new(store: Arc<dyn RemoteStore>, view: Arc<Mutex<View>>) -> Self {
        Self { store, view }
    }

    pub async fn click(&self, node: NodeId) -> Outcome {
        let action = self.view.lock().await.action_at(node);
        match action {
            Some(action) => self.dispatch(action).await,
            None => {
                debug!(%node, "click on element without action");
                Outcome::Skipped(SkipReason::NoAction(node))
            }
        }
    }

    pub async fn dispatch(&self, action: Action) -> Outcome {
        debug!(%action, "dispatching action");
        match action {
            Action::ReleaseCreature { creature_id } => self.release(creature_id).await,
            Action::AddCreature { trainer_id } => self.add(trainer_id).await,
        }
    }

    pub async fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) -> Vec<Outcome> {
        join_all(actions.into_iter().map(|action| self.dispatch(action))).await
    }

    // Completions run as spawned tasks: they finish and free their roster
    // reservation even when the caller stops polling the dispatch.
    async fn release(&self, creature_id: CreatureId) -> Outcome {
        let store = self.store.clone();
        let view = self.view.clone();
        settle(tokio::spawn(async move {
            // Pessimistic: the entry goes only once the store confirms.
            if let Err(err) = store.delete_creature(creature_id).await {
                return Outcome::Failed(err.into());
            }

            let removed = view.lock().await.remove_creature(creature_id);
            match removed {
                Some(entry) => Outcome::Released { creature_id, entry },
                None => Outcome::Skipped(SkipReason::EntryGone(creature_id)),
            }
        }))
        .await
    }

    async fn add(&self, trainer_id: TrainerId) -> Outcome {
        match self.view.lock().await.try_reserve(trainer_id, ROSTER_LIMIT) {
            Reservation::Reserved => {}
            Reservation::Full { size } => {
                debug!(%trainer_id, size, "roster full");
                return Outcome::Skipped(SkipReason::RosterFull { trainer_id, size });
            }
            Reservation::UnknownTrainer => {
                return Outcome::Skipped(SkipReason::UnknownTrainer(trainer_id));
            }
        }

        let store = self.store.clone();
        let view = self.view.clone();
        settle(tokio::spawn(async move {
            let created = store.create_creature(trainer_id).await;

            let mut view = view.lock().await;
            view.release_reservation(trainer_id);
            let creature = match created {
                Ok(creature) => creature,
                Err(err) => return Outcome::Failed(err.into()),
            };
            let Some(roster) = view.roster_of(trainer_id) else {
                return Outcome::Skipped(SkipReason::UnknownTrainer(trainer_id));
            };
            match view.render_creature(&creature, roster) {
                Ok(entry) => Outcome::Added {
                    trainer_id,
                    creature,
                    entry,
                },
                Err(err) => {
                    warn!(%trainer_id, error = %err, "failed to render created creature");
                    Outcome::Failed(err.into())
                }
            }
        }))
        .await
    }
}

async fn settle(completion: JoinHandle<Outcome>) -> Outcome {
    completion.await.unwrap_or_else(|err| {
        warn!(error = %err, "activation completion did not finish");
        Outcome::Failed(err.into())
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
