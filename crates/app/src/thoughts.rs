//! Collapsible thinking segments.
//!
//! Purely presentational: which thoughts are expanded has no bearing on the
//! conversation sent to the model.

use chat_session::GenerationResult;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thought {
    pub text: String,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct ReasoningTracker {
    next_id: u64,
    thoughts: BTreeMap<u64, Thought>,
}

impl ReasoningTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reasoning of a reply, if it should be displayed.
    ///
    /// Only non-empty reasoning from a model that supports it gets an id.
    /// Ids increase monotonically and new thoughts start expanded.
    pub fn record(&mut self, result: &GenerationResult, supports_reasoning: bool) -> Option<u64> {
        if !supports_reasoning || !result.has_reasoning() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.thoughts.insert(
            id,
            Thought {
                text: result.reasoning.clone(),
                visible: true,
            },
        );
        Some(id)
    }

    /// Flip visibility; returns the new state, or `None` for unknown ids.
    pub fn toggle(&mut self, id: u64) -> Option<bool> {
        let thought = self.thoughts.get_mut(&id)?;
        thought.visible = !thought.visible;
        Some(thought.visible)
    }

    pub fn get(&self, id: u64) -> Option<&Thought> {
        self.thoughts.get(&id)
    }
}
