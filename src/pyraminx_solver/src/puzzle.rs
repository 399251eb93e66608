use crate::{
    facelets::{Color, ShapeMismatch, StateVector},
    moves::{ApplyError, MoveTable, MoveTableError},
    solver::{SearchEngine, SearchError, SearchReport},
};
use thiserror::Error;

/// A puzzle being played: a move table, the goal configuration and the
/// working configuration that manual moves change and searches start from.
#[derive(Debug, Clone)]
pub struct Puzzle {
    move_table: MoveTable,
    goal: StateVector,
    state: StateVector,
    scratch: Vec<Color>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PuzzleError {
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatch),
    #[error(transparent)]
    MoveTable(#[from] MoveTableError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl From<ApplyError> for PuzzleError {
    fn from(error: ApplyError) -> Self {
        match error {
            ApplyError::MoveTable(error) => PuzzleError::MoveTable(error),
            ApplyError::ShapeMismatch(error) => PuzzleError::ShapeMismatch(error),
        }
    }
}

impl Puzzle {
    /// A solved puzzle with the given moves and goal.
    ///
    /// # Errors
    ///
    /// If the goal does not fit the move table.
    pub fn new(move_table: MoveTable, goal: StateVector) -> Result<Self, PuzzleError> {
        ShapeMismatch::check(move_table.facelet_count(), goal.len())?;
        Ok(Self {
            scratch: Vec::with_capacity(goal.len()),
            state: goal.clone(),
            move_table,
            goal,
        })
    }

    /// The reference pyraminx, solved.
    ///
    /// # Errors
    ///
    /// Never in practice; the reference move set is valid.
    pub fn pyraminx() -> Result<Self, PuzzleError> {
        Self::new(MoveTable::pyraminx()?, StateVector::solved())
    }

    #[must_use]
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    #[must_use]
    pub fn goal(&self) -> &StateVector {
        &self.goal
    }

    #[must_use]
    pub fn move_table(&self) -> &MoveTable {
        &self.move_table
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.state == self.goal
    }

    /// Replace the working configuration, e.g. with a scramble preset.
    ///
    /// # Errors
    ///
    /// If `state` does not fit the move table. The working configuration is
    /// left untouched in that case.
    pub fn initialize(&mut self, state: StateVector) -> Result<(), PuzzleError> {
        ShapeMismatch::check(self.move_table.facelet_count(), state.len())?;
        self.state = state;
        Ok(())
    }

    /// Apply a single move to the working configuration.
    ///
    /// # Errors
    ///
    /// `UnknownMove` if the table has no such move.
    pub fn apply_named_move(&mut self, name: &str) -> Result<&StateVector, PuzzleError> {
        let move_ = self.move_table.get(name)?;
        self.state
            .permute_in_place(move_.permutation(), &mut self.scratch)?;
        Ok(&self.state)
    }

    /// Apply a whitespace separated token sequence such as a solution.
    ///
    /// # Errors
    ///
    /// If a token is not a known move or repetition of one. Nothing is
    /// applied in that case.
    pub fn apply_tokens(&mut self, tokens: &str) -> Result<&StateVector, PuzzleError> {
        self.state = self.move_table.apply_tokens(&self.state, tokens)?;
        Ok(&self.state)
    }

    /// Apply `count` random moves, skipping moves that never change a state,
    /// and return the tokens applied.
    pub fn scramble(&mut self, count: usize, rng: &mut fastrand::Rng) -> Vec<String> {
        let candidates = self.move_table.without_identity_moves();
        let mut tokens = Vec::with_capacity(count);
        if candidates.moves().is_empty() {
            return tokens;
        }
        for _ in 0..count {
            let move_ = &candidates.moves()[rng.usize(..candidates.moves().len())];
            let power = rng.usize(1..move_.order());
            for _ in 0..power {
                self.state
                    .permute_in_place_unchecked(move_.permutation(), &mut self.scratch);
            }
            tokens.push(move_.token(power));
        }
        tokens
    }

    /// Search for a solution from the working configuration.
    ///
    /// # Errors
    ///
    /// See `SearchError`.
    pub fn solve(&self, max_depth: usize) -> Result<SearchReport, PuzzleError> {
        self.solve_from(&self.state, max_depth)
    }

    /// Search for a solution from an arbitrary configuration, leaving the
    /// working one alone.
    ///
    /// # Errors
    ///
    /// See `SearchError`.
    pub fn solve_from(
        &self,
        initial: &StateVector,
        max_depth: usize,
    ) -> Result<SearchReport, PuzzleError> {
        Ok(SearchEngine::new(&self.move_table)
            .with_goal(self.goal.clone())
            .with_max_depth(max_depth)
            .solve(initial)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facelets::Preset;

    #[test]
    fn named_moves_change_the_working_state() {
        let mut puzzle = Puzzle::pyraminx().unwrap();
        assert!(puzzle.is_solved());

        let r = puzzle.move_table().get("r").unwrap().clone();
        let after_r = puzzle.apply_named_move("r").unwrap().clone();
        assert_eq!(
            after_r,
            StateVector::solved().permuted(r.permutation()).unwrap()
        );
        assert!(!puzzle.is_solved());

        puzzle.apply_named_move("l").unwrap();
        assert_eq!(puzzle.state(), &after_r);

        puzzle.apply_named_move("r").unwrap();
        puzzle.apply_named_move("r").unwrap();
        assert!(puzzle.is_solved());

        assert_eq!(
            puzzle.apply_named_move("x"),
            Err(PuzzleError::MoveTable(MoveTableError::UnknownMove(
                "x".to_owned()
            )))
        );
    }

    #[test]
    fn initialize_checks_shape() {
        let mut puzzle = Puzzle::pyraminx().unwrap();
        puzzle.initialize(Preset::TopSwap.state()).unwrap();
        assert_eq!(puzzle.state(), &Preset::TopSwap.state());

        assert_eq!(
            puzzle.initialize(StateVector::new(vec![Color::Blue; 30])),
            Err(PuzzleError::ShapeMismatch(ShapeMismatch {
                expected: 28,
                actual: 30
            }))
        );
        assert_eq!(puzzle.state(), &Preset::TopSwap.state());
    }

    #[test]
    fn failed_token_sequence_applies_nothing() {
        let mut puzzle = Puzzle::pyraminx().unwrap();
        assert!(puzzle.apply_tokens("r t q").is_err());
        assert!(puzzle.is_solved());
        puzzle.apply_tokens("r rr").unwrap();
        assert!(puzzle.is_solved());
    }

    #[test]
    fn scramble_is_reproducible() {
        let mut first = Puzzle::pyraminx().unwrap();
        let mut second = Puzzle::pyraminx().unwrap();
        let tokens = first.scramble(12, &mut fastrand::Rng::with_seed(42));
        assert_eq!(
            second.scramble(12, &mut fastrand::Rng::with_seed(42)),
            tokens
        );
        assert_eq!(tokens.len(), 12);
        assert!(tokens.iter().all(|token| !token.starts_with('l')));
        assert_eq!(first.state(), second.state());

        let mut replayed = Puzzle::pyraminx().unwrap();
        replayed.apply_tokens(&tokens.join(" ")).unwrap();
        assert_eq!(replayed.state(), first.state());
    }

    #[test]
    fn solve_leaves_working_state() {
        let mut puzzle = Puzzle::pyraminx().unwrap();
        puzzle.apply_named_move("r").unwrap();
        let before = puzzle.state().clone();
        let report = puzzle.solve(25).unwrap();
        assert_eq!(report.solution().unwrap().to_string(), "r r");
        assert_eq!(puzzle.state(), &before);
    }
}
