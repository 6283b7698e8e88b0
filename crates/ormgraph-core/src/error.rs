//! Error types for the model graph engine.
//!
//! Absent results (unknown models, unresolved path segments, truncated
//! cycles) are reported as `Option::None`; the only hard failure is use of a
//! derived object after the declaration set it was built from was replaced.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A model class or type outlived the analysis generation it belongs to.
    #[error("stale model \"{model}\": generation {generation} was discarded (current generation is {current})")]
    Stale {
        model: String,
        generation: u64,
        current: u64,
    },
}

impl GraphError {
    pub fn stale(model: impl Into<String>, generation: u64, current: u64) -> Self {
        GraphError::Stale {
            model: model.into(),
            generation,
            current,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, GraphError::Stale { .. })
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
