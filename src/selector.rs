//! View-selector table: which render function is authoritative right now.
//!
//! Guarded rules are kept newest-first so the most recently declared rule
//! wins. The single unguarded rule is the fallback and is only consulted
//! when no guard matches.

use std::sync::Arc;

use crate::client::InteractionEvent;
use crate::error::ViewError;
use crate::render::RenderResult;

/// Guard deciding whether a render rule applies.
pub type Predicate<S> = Arc<dyn Fn(&S, Option<&InteractionEvent>) -> bool + Send + Sync>;

/// Fills a [`RenderResult`] from the instance state.
pub type RenderFn<S> = Arc<dyn Fn(&mut S, &mut RenderResult) + Send + Sync>;

/// A (predicate, render function) pair.
pub struct RenderRule<S> {
    predicate: Option<Predicate<S>>,
    render: RenderFn<S>,
}

impl<S> RenderRule<S> {
    pub fn is_fallback(&self) -> bool {
        self.predicate.is_none()
    }

    fn matches(&self, state: &S, interaction: Option<&InteractionEvent>) -> bool {
        self.predicate
            .as_ref()
            .is_some_and(|predicate| predicate(state, interaction))
    }

    pub(crate) fn render(&self, state: &mut S, result: &mut RenderResult) {
        (self.render)(state, result)
    }
}

pub struct SelectorTable<S> {
    view: String,
    rules: Vec<RenderRule<S>>,
}

impl<S> SelectorTable<S> {
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule at the head of the table.
    pub fn add(&mut self, predicate: Option<Predicate<S>>, render: RenderFn<S>) {
        self.rules.insert(0, RenderRule { predicate, render });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check the table has rules and exactly one fallback.
    pub fn validate(&self) -> Result<(), ViewError> {
        if self.is_empty() {
            return Err(ViewError::NoRenderRules {
                view: self.view.clone(),
            });
        }
        match self.rules.iter().filter(|rule| rule.is_fallback()).count() {
            0 => Err(ViewError::NoFallbackRule {
                view: self.view.clone(),
            }),
            1 => Ok(()),
            count => Err(ViewError::MultipleFallbackRules {
                view: self.view.clone(),
                count,
            }),
        }
    }

    /// Pick the rule to render with.
    ///
    /// Returns `None` only for a table that fails [`validate`](Self::validate).
    pub fn select_active(
        &self,
        state: &S,
        interaction: Option<&InteractionEvent>,
    ) -> Option<&RenderRule<S>> {
        let guarded = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| !rule.is_fallback())
            .find(|(_, rule)| rule.matches(state, interaction));
        if let Some((position, rule)) = guarded {
            tracing::trace!(view = %self.view, position, "Selected guarded view");
            return Some(rule);
        }
        tracing::trace!(view = %self.view, "Selected fallback view");
        self.rules.iter().find(|rule| rule.is_fallback())
    }
}
