use thiserror::Error;

use crate::session::DrillKind;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("insufficient vocabulary for {drill}: need at least {needed} entries, have {available}")]
    InsufficientVocabulary {
        drill: DrillKind,
        needed: usize,
        available: usize,
    },

    #[error("duplicate entry identity: {0}")]
    DuplicateIdentity(String),

    #[error("round {round} has been superseded")]
    StaleCallback { round: u64 },

    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl EngineError {
    pub fn persistence(err: anyhow::Error) -> Self {
        EngineError::PersistenceUnavailable(format!("{err:#}"))
    }
}
