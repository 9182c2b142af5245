use crate::env::Environment;
use crate::registry::ItemRegistry;
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Everything one invocation of a step knows about who runs it.
///
/// Lives only for the duration of a single execution.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    caller: String,
    env: Environment,
    cancelled: Arc<AtomicBool>,
}

impl InvocationContext {
    /// `caller` is the full name of the item running the step.
    pub fn new(caller: impl Into<String>, env: Environment) -> Self {
        Self {
            caller: caller.into(),
            env,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Flag the enclosing pipeline sets to stop the step between two deletions.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of a configuration-time field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Ok,
    Error(String),
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        matches!(self, Validation::Ok)
    }
}

/// A step the host pipeline can run.
pub trait BuildStep {
    /// Human-readable name shown by the host.
    fn display_name(&self) -> &'static str;

    /// Runs the step, writing progress lines to `log`.
    ///
    /// `Ok(true)` lets the pipeline go on, `Ok(false)` fails the step. `Err` is
    /// reserved for the log itself becoming unwritable.
    fn perform(
        &self,
        ctx: &InvocationContext,
        registry: &dyn ItemRegistry,
        log: &mut dyn Write,
    ) -> Result<bool>;
}
