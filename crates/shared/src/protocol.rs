use serde::{Deserialize, Serialize};

use crate::domain::TrainerId;

/// Body of `POST /pokemons/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCreatureRequest {
    pub trainer_id: TrainerId,
}
