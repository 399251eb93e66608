use crate::facelets::StateKey;
use fxhash::FxHashMap;

/// What the visited index decided about a state reached at some depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Never seen before; recorded.
    New,
    /// Seen before but only deeper; the record now holds the shallower depth.
    Improved { previous_depth: usize },
    /// Already seen at this depth or shallower. The state must not be
    /// expanded again.
    Redundant { recorded_depth: usize },
}

impl Visit {
    #[must_use]
    pub fn should_expand(self) -> bool {
        !matches!(self, Visit::Redundant { .. })
    }
}

/// Maps every encoded state to the shallowest depth it was reached at during
/// one search.
#[derive(Debug, Default)]
pub struct VisitedIndex {
    depths: FxHashMap<StateKey, usize>,
}

impl VisitedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` was reached at `depth` unless it was already reached
    /// at `depth` or shallower.
    pub fn visit(&mut self, key: StateKey, depth: usize) -> Visit {
        match self.depths.get_mut(&key) {
            Some(recorded_depth) if *recorded_depth <= depth => Visit::Redundant {
                recorded_depth: *recorded_depth,
            },
            Some(recorded_depth) => {
                let previous_depth = std::mem::replace(recorded_depth, depth);
                Visit::Improved { previous_depth }
            }
            None => {
                self.depths.insert(key, depth);
                Visit::New
            }
        }
    }

    #[must_use]
    pub fn depth(&self, key: &StateKey) -> Option<usize> {
        self.depths.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}
