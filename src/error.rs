//! Error types for a prune step.

use crate::registry::RegistryError;
use thiserror::Error;

/// Result type for prune operations.
pub type PruneResult<T> = Result<T, PruneError>;

/// Reasons a prune step ends in failure.
#[derive(Debug, Error)]
pub enum PruneError {
    /// The target resolved to an empty or blank string.
    #[error("deletion target is empty")]
    EmptySelector,

    /// The resolved target is not a valid regular expression.
    #[error("invalid deletion target '{pattern}': {source}")]
    InvalidPattern {
        /// The resolved target as it was compiled.
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// No item other than the caller matched.
    #[error("no job matches '{selector}'")]
    NoMatch {
        /// The resolved target.
        selector: String,
    },

    /// Items matched, but each one was already gone by the time it was deleted.
    #[error("every job matching '{selector}' was already gone")]
    NothingDeleted {
        /// The resolved target.
        selector: String,
    },

    /// A deletion failed; the remaining items were left untouched.
    #[error("failed to delete '{name}' after deleting {} job(s): {source}", deleted.len())]
    DeleteFailure {
        /// Full name of the item whose deletion failed.
        name: String,
        /// Items deleted before the failure. They stay deleted.
        deleted: Vec<String>,
        #[source]
        source: RegistryError,
    },

    /// The invocation was cancelled between two deletions.
    #[error("interrupted after deleting {} job(s)", deleted.len())]
    Interrupted {
        /// Items deleted before the interruption.
        deleted: Vec<String>,
    },

    /// The registry could not be listed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Writing to the step log failed.
    #[error("failed to write step log: {0}")]
    Log(#[from] std::io::Error),
}

/// Why a target failed to compile.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Syntax(#[from] regex_syntax::Error),

    #[error(transparent)]
    Build(#[from] regex_automata::meta::BuildError),
}

impl PruneError {
    /// Items that were deleted before the step failed.
    pub fn deleted(&self) -> &[String] {
        match self {
            PruneError::DeleteFailure { deleted, .. } | PruneError::Interrupted { deleted } => {
                deleted
            }
            _ => &[],
        }
    }
}
