//! Selection engine: turns the configured target into the list of items to delete.

use crate::env::VariableExpander;
use crate::error::{PatternError, PruneError, PruneResult};
use crate::registry::Item;
use regex_automata::meta::Regex;
use regex_syntax::hir::{Hir, Look};

/// Resolve the configured target template into a selector.
///
/// Returns an empty string when the template is blank, or when it expands to a blank
/// string. Otherwise the expansion is returned unchanged, surrounding whitespace
/// included. Unbound placeholders are whatever `expander` makes of them.
pub fn resolve_selector<E>(raw_template: &str, expander: &E) -> String
where
    E: VariableExpander + ?Sized,
{
    if raw_template.trim().is_empty() {
        return String::new();
    }
    let expanded = expander.expand(raw_template);
    if expanded.trim().is_empty() {
        return String::new();
    }
    expanded
}

/// A compiled selector that matches whole full names only.
#[derive(Debug, Clone)]
pub struct Selector {
    regex: Regex,
}

impl Selector {
    /// Compile `pattern`. A blank pattern is [`PruneError::EmptySelector`], a pattern
    /// that does not parse is [`PruneError::InvalidPattern`].
    pub fn new(pattern: &str) -> PruneResult<Self> {
        if pattern.trim().is_empty() {
            return Err(PruneError::EmptySelector);
        }
        let invalid = |source: PatternError| PruneError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        };
        // Anchors go around the parsed tree, not the text, so flags and comments in
        // the pattern can't interfere with them.
        let parsed = regex_syntax::Parser::new()
            .parse(pattern)
            .map_err(|e| invalid(e.into()))?;
        let anchored = Hir::concat(vec![Hir::look(Look::Start), parsed, Hir::look(Look::End)]);
        let regex = Regex::builder()
            .build_from_hir(&anchored)
            .map_err(|e| invalid(e.into()))?;
        Ok(Self { regex })
    }

    /// True if the entire `name` matches; substring hits don't count.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Pick the items to delete, in registry order.
///
/// The caller is dropped by exact full-name comparison before any matching happens, so
/// it is never selected even when the selector would match it.
pub fn select_for_deletion<T, I>(
    items: I,
    resolved_selector: &str,
    caller_full_name: &str,
) -> PruneResult<Vec<T>>
where
    T: Item,
    I: IntoIterator<Item = T>,
{
    let selector = Selector::new(resolved_selector)?;
    Ok(items
        .into_iter()
        .filter(|item| item.full_name() != caller_full_name)
        .filter(|item| selector.matches(item.full_name()))
        .collect())
}
