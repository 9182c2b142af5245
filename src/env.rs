use crate::lexer::{self, TemplatePart};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env as stdenv;

/// Substitutes variable placeholders in a template.
///
/// The selection engine only depends on this contract, so any host-side expansion
/// scheme can be plugged in.
pub trait VariableExpander {
    /// Return `template` with every recognized placeholder substituted.
    fn expand(&self, template: &str) -> String;
}

/// Variable bindings visible to one invocation of a step.
///
/// Note: `vars` is public to keep construction in tests and the CLI short.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of bindings (e.g., JOB_NAME, TARGET).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment into a new `Environment` instance.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Build an environment from explicit bindings only.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the value of a binding.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a binding.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Override bindings in bulk; later entries win.
    pub fn extend<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.vars.extend(vars);
    }
}

impl VariableExpander for Environment {
    /// Unbound placeholders are left in place as literal text.
    fn expand(&self, template: &str) -> String {
        lexer::split_template(template)
            .into_iter()
            .map(|part| match &part {
                TemplatePart::Literal(text) => text.clone(),
                TemplatePart::Var { name, .. } => match self.get_var(name) {
                    Some(value) => value.to_string(),
                    None => part.source(),
                },
            })
            .collect()
    }
}

/// Parse a `KEY=VALUE` binding as given on the command line.
///
/// The value may be empty and may itself contain `=`.
pub fn parse_binding(binding: &str) -> Result<(String, String)> {
    let (key, value) = binding
        .split_once('=')
        .with_context(|| format!("invalid binding '{}': expected KEY=VALUE", binding))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow::anyhow!("invalid binding '{}': empty key", binding));
    }
    Ok((key.to_string(), value.to_string()))
}
