use crate::{
    facelets::{Color, ShapeMismatch, StateVector},
    moves::{Move, MoveTable},
    start, success,
    visited::VisitedIndex,
    working,
};
use itertools::Itertools;
use log::{debug, info, warn};
use std::{
    fmt,
    time::{Duration, Instant},
};
use thiserror::Error;

/// The depth bound used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// A progress line is logged every time this many states have been expanded.
const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Depth-bounded depth first search with memoization of the shallowest depth
/// at which each state was reached. The first solution found wins; it is not
/// necessarily the shortest.
#[derive(Debug, Clone)]
pub struct SearchEngine<'a> {
    move_table: &'a MoveTable,
    goal: StateVector,
    max_depth: usize,
}

/// Everything a single search mutates. Owned by one `solve` call and passed
/// down the recursion by exclusive reference.
struct SearchMutable {
    state: StateVector,
    scratch: Vec<Color>,
    visited: VisitedIndex,
    path: Vec<Step>,
    solution: Option<Vec<Step>>,
    stats: SearchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    move_index: usize,
    power: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("The initial state does not fit the move table: {0}")]
    InitialState(ShapeMismatch),
    #[error("The goal state does not fit the move table: {0}")]
    Goal(ShapeMismatch),
}

/// Counters describing how much of the state graph a search touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Every recursive call, including the ones cut off by depth or memo.
    pub nodes_visited: u64,
    /// States recorded in the visited index and expanded with every move.
    pub states_expanded: u64,
    /// Revisits pruned because the state was already reached as shallow.
    pub memo_prunes: u64,
    /// Calls beyond the depth bound.
    pub depth_cutoffs: u64,
    /// Distinct states in the visited index when the search ended.
    pub distinct_states: usize,
}

/// One token of a solution: `power` consecutive applications of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionStep {
    pub move_name: String,
    pub power: usize,
}

impl SolutionStep {
    #[must_use]
    pub fn token(&self) -> String {
        self.move_name.repeat(self.power)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    steps: Vec<SolutionStep>,
}

impl Solution {
    #[must_use]
    pub fn steps(&self) -> &[SolutionStep] {
        &self.steps
    }

    pub fn tokens(&self) -> impl Iterator<Item = String> {
        self.steps.iter().map(SolutionStep::token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Solution),
    /// The depth bound was exhausted without reaching the goal. This is an
    /// ordinary outcome, not an error.
    NotFound { max_depth: usize },
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

impl SearchReport {
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            SearchOutcome::Solved(solution) => Some(solution),
            SearchOutcome::NotFound { .. } => None,
        }
    }
}

impl SearchMutable {
    fn new(state: StateVector) -> Self {
        Self {
            scratch: Vec::with_capacity(state.len()),
            state,
            visited: VisitedIndex::new(),
            path: vec![],
            solution: None,
            stats: SearchStats::default(),
        }
    }

    fn found_solution(&self) -> bool {
        self.solution.is_some()
    }

    fn apply(&mut self, move_: &Move) {
        self.state
            .permute_in_place_unchecked(move_.permutation(), &mut self.scratch);
    }
}

impl<'a> SearchEngine<'a> {
    /// A search over `move_table` towards the reference solved state with the
    /// default depth bound.
    #[must_use]
    pub fn new(move_table: &'a MoveTable) -> Self {
        Self {
            move_table,
            goal: StateVector::solved(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_goal(mut self, goal: StateVector) -> Self {
        self.goal = goal;
        self
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn goal(&self) -> &StateVector {
        &self.goal
    }

    #[must_use]
    pub fn move_table(&self) -> &'a MoveTable {
        self.move_table
    }

    /// The recursion. Returns whether a solution has been found anywhere in
    /// the search tree. The working state is the same on return as on entry.
    ///
    /// Every move is explored by applying it `1..order` times, recursing
    /// after each application, and then applying it once more to complete
    /// its cycle. Because the order is computed per move this restores the
    /// state for moves of any order.
    fn search_for_solution(&self, mutable: &mut SearchMutable, depth: usize) -> bool {
        mutable.stats.nodes_visited += 1;
        if mutable.found_solution() {
            return true;
        }
        if depth > self.max_depth {
            mutable.stats.depth_cutoffs += 1;
            return false;
        }
        if mutable.state == self.goal {
            mutable.solution = Some(mutable.path.clone());
            return true;
        }
        if !mutable
            .visited
            .visit(mutable.state.encode(), depth)
            .should_expand()
        {
            mutable.stats.memo_prunes += 1;
            return false;
        }

        mutable.stats.states_expanded += 1;
        if mutable.stats.states_expanded % PROGRESS_INTERVAL == 0 {
            info!(
                working!("Expanded {} states ({} distinct)"),
                mutable.stats.states_expanded,
                mutable.visited.len()
            );
        }

        for (move_index, move_) in self.move_table.moves().iter().enumerate() {
            let order = move_.order();
            for power in 1..order {
                mutable.apply(move_);
                mutable.path.push(Step { move_index, power });
                let found = self.search_for_solution(mutable, depth + 1);
                mutable.path.pop();
                if found {
                    for _ in power..order {
                        mutable.apply(move_);
                    }
                    return true;
                }
            }
            mutable.apply(move_);
        }
        false
    }

    /// Search for a move sequence that takes `initial` to the goal.
    ///
    /// # Errors
    ///
    /// If `initial` or the goal has a different length than the move table's
    /// permutations. Exhausting the depth bound is reported as
    /// `SearchOutcome::NotFound`, not as an error.
    pub fn solve(&self, initial: &StateVector) -> Result<SearchReport, SearchError> {
        let facelet_count = self.move_table.facelet_count();
        ShapeMismatch::check(facelet_count, initial.len()).map_err(SearchError::InitialState)?;
        ShapeMismatch::check(facelet_count, self.goal.len()).map_err(SearchError::Goal)?;
        if initial.color_counts() != self.goal.color_counts() {
            warn!("The initial state has different color counts than the goal and cannot reach it");
        }

        info!(
            start!("Searching for a solution within {} moves"),
            self.max_depth
        );
        let start = Instant::now();

        let mut mutable = SearchMutable::new(initial.clone());
        self.search_for_solution(&mut mutable, 0);
        debug_assert_eq!(&mutable.state, initial);
        mutable.stats.distinct_states = mutable.visited.len();

        let elapsed = start.elapsed();
        let outcome = match mutable.solution.take() {
            Some(steps) => {
                info!(
                    success!("Found a {} move solution in {:.3}s"),
                    steps.len(),
                    elapsed.as_secs_f64()
                );
                SearchOutcome::Solved(self.solution_from_steps(&steps))
            }
            None => {
                info!(
                    "No solution within {} moves after {:.3}s",
                    self.max_depth,
                    elapsed.as_secs_f64()
                );
                SearchOutcome::NotFound {
                    max_depth: self.max_depth,
                }
            }
        };
        debug!(
            working!("Visited {} nodes, expanded {} states, pruned {} revisits, cut off {}"),
            mutable.stats.nodes_visited,
            mutable.stats.states_expanded,
            mutable.stats.memo_prunes,
            mutable.stats.depth_cutoffs
        );

        Ok(SearchReport {
            outcome,
            stats: mutable.stats,
            elapsed,
        })
    }

    fn solution_from_steps(&self, steps: &[Step]) -> Solution {
        let moves = self.move_table.moves();
        Solution {
            steps: steps
                .iter()
                .map(|step| SolutionStep {
                    move_name: moves[step.move_index].name().to_owned(),
                    power: step.power,
                })
                .collect(),
        }
    }
}
