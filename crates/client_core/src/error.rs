use reqwest::StatusCode;
use thiserror::Error;

use crate::view::ViewError;

/// Names the store call that failed, for logs and outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    ListTrainers,
    DeleteCreature,
    CreateCreature,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListTrainers => "list_trainers",
            Self::DeleteCreature => "delete_creature",
            Self::CreateCreature => "create_creature",
        }
    }
}

/// Every variant is a transport failure from the caller's point of view;
/// the split only sharpens the log line.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} request to {url} failed: {source}", .operation.as_str())]
    Transport {
        operation: StoreOperation,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{} request to {url} returned {status}", .operation.as_str())]
    Status {
        operation: StoreOperation,
        url: String,
        status: StatusCode,
    },
    #[error("{} response from {url} was not valid JSON: {source}", .operation.as_str())]
    Decode {
        operation: StoreOperation,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl StoreError {
    pub fn operation(&self) -> StoreOperation {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => *operation,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("completion task failed: {0}")]
    Completion(#[from] tokio::task::JoinError),
}
