use crate::error::{PruneError, PruneResult};
use crate::registry::{Item, ItemRegistry, RegistryError};
use crate::selector::{resolve_selector, select_for_deletion};
use crate::step::{BuildStep, InvocationContext, Validation};
use std::io::Write;
use tracing::{debug, info, warn};

/// Build step that deletes every job whose full name matches a configured target.
///
/// The target is a literal name, a regular expression, or a template with `${NAME}`
/// placeholders. It always matches whole names, and the job running the step is
/// never deleted.
///
/// Example
/// ```
/// use job_pruner::{Environment, InvocationContext, JobDeleteStep, MemoryRegistry};
/// let registry = MemoryRegistry::from_names(["job1", "job2", "runner"]);
/// let ctx = InvocationContext::new("runner", Environment::default());
/// let deleted = JobDeleteStep::new("job.*")
///     .run(&ctx, &registry, &mut std::io::sink())
///     .unwrap();
/// assert_eq!(deleted, vec!["job1", "job2"]);
/// assert_eq!(registry.names(), vec!["runner"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDeleteStep {
    target: String,
}

impl JobDeleteStep {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The raw, unexpanded target template.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Configuration-time check of a target value.
    ///
    /// Only an empty value is rejected; whether it compiles is checked when it runs.
    pub fn check_target(value: &str) -> Validation {
        if value.is_empty() {
            Validation::Error(PruneError::EmptySelector.to_string())
        } else {
            Validation::Ok
        }
    }

    /// Expand the target against the invocation's bindings.
    pub fn resolve(&self, ctx: &InvocationContext) -> PruneResult<String> {
        let selector = resolve_selector(&self.target, ctx.env());
        if selector.is_empty() {
            return Err(PruneError::EmptySelector);
        }
        Ok(selector)
    }

    /// Resolve and select without deleting anything.
    pub fn preview(
        &self,
        ctx: &InvocationContext,
        registry: &dyn ItemRegistry,
    ) -> PruneResult<Vec<String>> {
        let selector = self.resolve(ctx)?;
        let selected = self.select(ctx, registry, &selector)?;
        Ok(selected
            .iter()
            .map(|item| item.full_name())
            .filter(|name| !holds_caller(name, ctx.caller()))
            .map(str::to_string)
            .collect())
    }

    /// Resolve, select and delete, writing one line per step to `log`.
    ///
    /// Returns the full names actually deleted, in registry order. The first hard
    /// delete failure aborts the batch; items that vanished on their own are skipped
    /// with a warning. So are folders the caller lives in, since deleting one would
    /// delete the caller with it. Nothing already deleted is restored.
    pub fn run(
        &self,
        ctx: &InvocationContext,
        registry: &dyn ItemRegistry,
        log: &mut dyn Write,
    ) -> PruneResult<Vec<String>> {
        let selector = self.resolve(ctx)?;
        writeln!(log, "Deletion target : {}", selector)?;
        info!(selector = %selector, caller = ctx.caller(), "resolved deletion target");

        let selected = self.select(ctx, registry, &selector)?;

        let mut deleted = Vec::with_capacity(selected.len());
        for item in &selected {
            if ctx.is_cancelled() {
                warn!(deleted = deleted.len(), "prune interrupted");
                return Err(PruneError::Interrupted { deleted });
            }
            let name = item.full_name();
            if holds_caller(name, ctx.caller()) {
                writeln!(log, "Warning : {} contains {}, skipped", name, ctx.caller())?;
                warn!(job = name, caller = ctx.caller(), "folder holds the caller");
                continue;
            }
            match item.delete() {
                Ok(()) => {
                    writeln!(log, "Deleted : {}", name)?;
                    info!(job = name, "deleted job");
                    deleted.push(name.to_string());
                }
                Err(RegistryError::Gone { .. }) => {
                    writeln!(log, "Warning : {} no longer exists, skipped", name)?;
                    warn!(job = name, "job vanished before deletion");
                }
                Err(source) => {
                    return Err(PruneError::DeleteFailure {
                        name: name.to_string(),
                        deleted,
                        source,
                    });
                }
            }
        }

        if deleted.is_empty() {
            return Err(PruneError::NothingDeleted { selector });
        }
        Ok(deleted)
    }

    fn select(
        &self,
        ctx: &InvocationContext,
        registry: &dyn ItemRegistry,
        selector: &str,
    ) -> PruneResult<Vec<Box<dyn Item>>> {
        let items = registry.list_all()?;
        let total = items.len();
        let selected = select_for_deletion(items, selector, ctx.caller())?;
        debug!(total, selected = selected.len(), "matched registry");
        if selected.is_empty() {
            return Err(PruneError::NoMatch {
                selector: selector.to_string(),
            });
        }
        Ok(selected)
    }
}

/// True if `name` is a folder above `caller`, e.g. `team` for `team/runner`.
fn holds_caller(name: &str, caller: &str) -> bool {
    caller
        .strip_prefix(name)
        .is_some_and(|rest| rest.starts_with('/'))
}

impl BuildStep for JobDeleteStep {
    fn display_name(&self) -> &'static str {
        "Delete jobs"
    }

    fn perform(
        &self,
        ctx: &InvocationContext,
        registry: &dyn ItemRegistry,
        log: &mut dyn Write,
    ) -> anyhow::Result<bool> {
        match self.run(ctx, registry, log) {
            Ok(_) => Ok(true),
            Err(PruneError::Log(e)) => Err(e.into()),
            Err(e) => {
                writeln!(log, "Error : {}", e)?;
                warn!(error = %e, "prune step failed");
                Ok(false)
            }
        }
    }
}
