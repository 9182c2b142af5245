//! A job-pruning build step.
//!
//! Given a target (a literal job name, a regular expression, or a template with
//! `${NAME}` placeholders), the step deletes every job in a registry whose full name
//! matches the whole target, but never the job that runs the step.
//!
//! The main entry point is [`JobDeleteStep`]. The registry is injected through the
//! [`ItemRegistry`] and [`Item`] traits, and placeholder expansion through
//! [`VariableExpander`], so hosts can plug in their own and tests can use
//! [`MemoryRegistry`].

pub mod cli;
pub mod config;
pub mod dir_registry;
pub mod env;
pub mod error;
mod lexer;
pub mod logging;
pub mod registry;
mod runner;
pub mod selector;
pub mod step;

pub use dir_registry::DirRegistry;
pub use env::{Environment, VariableExpander};
pub use error::{PruneError, PruneResult};
pub use registry::{Item, ItemRegistry, MemoryRegistry, RegistryError};
pub use runner::JobDeleteStep;
pub use selector::{Selector, resolve_selector, select_for_deletion};
pub use step::{BuildStep, ExitCode, InvocationContext, Validation};
