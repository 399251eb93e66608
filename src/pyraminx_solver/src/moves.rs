use crate::{
    facelets::{FACELET_COUNT, ShapeMismatch, StateVector},
    working,
};
use itertools::Itertools;
use log::{debug, warn};
use std::sync::LazyLock;
use thiserror::Error;

/// A bijection of facelet positions. Applying it to a state `S` yields `S'`
/// with `S'[i] = S[self[i]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    indices: Box<[usize]>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PermutationError {
    #[error("Permutation index out of range, expected a value below {len} but got {index}")]
    IndexOutOfRange { len: usize, index: usize },
    #[error("Permutation index {0} appears more than once")]
    RepeatedIndex(usize),
}

impl Permutation {
    /// Validate and wrap a list of source indices.
    ///
    /// # Errors
    ///
    /// If an index is out of range or used twice.
    pub fn new(indices: Vec<usize>) -> Result<Self, PermutationError> {
        let len = indices.len();
        let mut covered = vec![false; len];
        for &index in &indices {
            match covered.get_mut(index) {
                Some(true) => return Err(PermutationError::RepeatedIndex(index)),
                Some(slot) => *slot = true,
                None => return Err(PermutationError::IndexOutOfRange { len, index }),
            }
        }
        Ok(Self {
            indices: indices.into_boxed_slice(),
        })
    }

    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.indices.iter().enumerate().all(|(i, &index)| i == index)
    }

    /// The permutation equivalent to applying `self` and then `other`.
    ///
    /// # Errors
    ///
    /// If the two permutations have different lengths.
    pub fn then(&self, other: &Self) -> Result<Self, ShapeMismatch> {
        ShapeMismatch::check(self.len(), other.len())?;
        Ok(Self {
            indices: other.indices.iter().map(|&i| self.indices[i]).collect(),
        })
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut indices = vec![0; self.len()].into_boxed_slice();
        for (i, &index) in self.indices.iter().enumerate() {
            indices[index] = i;
        }
        Self { indices }
    }

    /// The smallest `k > 0` such that applying `self` `k` times is the
    /// identity, or `None` if that exceeds `max_order`.
    #[must_use]
    pub fn order(&self, max_order: usize) -> Option<usize> {
        let mut power = self.clone();
        for order in 1..=max_order {
            if power.is_identity() {
                return Some(order);
            }
            power = Self {
                indices: self.indices.iter().map(|&i| power.indices[i]).collect(),
            };
        }
        None
    }
}

/// A named move as written in a move set definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDef {
    pub name: String,
    pub permutation: Vec<usize>,
}

/// A named collection of moves acting on states of one length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSetDef {
    pub name: String,
    pub facelet_count: usize,
    pub moves: Vec<MoveDef>,
}

/// The reference pyraminx move set. `l` reduces to the identity permutation
/// in the source data; it is kept as declared so search results stay
/// comparable, and a correct permutation can be supplied through a custom
/// [`MoveSetDef`].
pub static PYRAMINX: LazyLock<MoveSetDef> = LazyLock::new(|| MoveSetDef {
    name: "pyraminx".to_owned(),
    facelet_count: FACELET_COUNT,
    moves: vec![
        MoveDef {
            // Twist the top corner: 5, 6, 1 move to the left face, 17, 18, 19
            // to the bottom face and 22, 26, 27 to the front face
            name: "r".to_owned(),
            permutation: vec![
                0, 22, 2, 3, 4, 26, 27, //
                7, 12, 13, 8, 9, 10, 11, //
                14, 15, 16, 5, 6, 1, 20, //
                21, 19, 23, 24, 25, 17, 18, //
            ],
        },
        MoveDef {
            name: "l".to_owned(),
            permutation: (0..FACELET_COUNT).collect(),
        },
        MoveDef {
            // Rotate the whole puzzle about the bottom face
            name: "t".to_owned(),
            permutation: vec![
                7, 8, 9, 10, 11, 12, 13, //
                14, 15, 16, 17, 18, 19, 20, //
                0, 1, 2, 3, 4, 5, 6, //
                21, 24, 25, 26, 27, 22, 23, //
            ],
        },
    ],
});

/// Moves whose order exceeds this are rejected; search would expand
/// `order - 1` children per move.
pub const MAX_MOVE_ORDER: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    name: String,
    permutation: Permutation,
    order: usize,
}

impl Move {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// The number of consecutive applications that restore any state.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.order == 1
    }

    /// The token written for `power` consecutive applications, e.g. `rr`.
    #[must_use]
    pub fn token(&self, power: usize) -> String {
        self.name.repeat(power)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoveTableError {
    #[error("Unknown move `{0}`")]
    UnknownMove(String),
    #[error("Move `{0}` is declared more than once")]
    DuplicateMove(String),
    #[error("Move names must not be empty")]
    EmptyMoveName,
    #[error("Move `{name}` is not a valid permutation: {source}")]
    InvalidPermutation {
        name: String,
        source: PermutationError,
    },
    #[error("Move `{name}` does not fit the move set: {source}")]
    ShapeMismatch { name: String, source: ShapeMismatch },
    #[error("Move `{0}` has an order above {max}", max = MAX_MOVE_ORDER)]
    MoveOrderTooHigh(String),
    #[error("Move `{name}` is a repetition of move `{other}`, so their tokens would be ambiguous")]
    AmbiguousMoveName { name: String, other: String },
    #[error("Token `{0}` is not a repetition of a known move")]
    InvalidToken(String),
}

/// How many times `name` is repeated to spell `token`, if it does.
fn repetitions(token: &str, name: &str) -> Option<usize> {
    let name_len = name.len();
    (name_len > 0
        && token.len() % name_len == 0
        && token.as_bytes().chunks(name_len).all(|chunk| chunk == name.as_bytes()))
    .then(|| token.len() / name_len)
}

/// The catalog of moves available to manual play and to the search, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTable {
    name: String,
    facelet_count: usize,
    moves: Box<[Move]>,
}

impl MoveTable {
    /// Build a move table, validating every permutation and computing its
    /// order.
    ///
    /// # Errors
    ///
    /// See `MoveTableError`.
    pub fn new(move_set_def: &MoveSetDef) -> Result<Self, MoveTableError> {
        let mut moves: Vec<Move> = Vec::with_capacity(move_set_def.moves.len());
        for move_def in &move_set_def.moves {
            if move_def.name.is_empty() {
                return Err(MoveTableError::EmptyMoveName);
            }
            if moves.iter().any(|move_| move_.name == move_def.name) {
                return Err(MoveTableError::DuplicateMove(move_def.name.clone()));
            }
            if let Some(other) = moves.iter().find(|move_| {
                repetitions(&move_def.name, &move_.name).is_some()
                    || repetitions(&move_.name, &move_def.name).is_some()
            }) {
                return Err(MoveTableError::AmbiguousMoveName {
                    name: move_def.name.clone(),
                    other: other.name.clone(),
                });
            }
            ShapeMismatch::check(move_set_def.facelet_count, move_def.permutation.len()).map_err(
                |source| MoveTableError::ShapeMismatch {
                    name: move_def.name.clone(),
                    source,
                },
            )?;
            let permutation = Permutation::new(move_def.permutation.clone()).map_err(|source| {
                MoveTableError::InvalidPermutation {
                    name: move_def.name.clone(),
                    source,
                }
            })?;
            let order = permutation
                .order(MAX_MOVE_ORDER)
                .ok_or_else(|| MoveTableError::MoveOrderTooHigh(move_def.name.clone()))?;
            if order == 1 {
                warn!(
                    "Move `{}` of `{}` is the identity permutation and never changes a state",
                    move_def.name, move_set_def.name
                );
            }
            debug!(working!("Move `{}` has order {}"), move_def.name, order);
            moves.push(Move {
                name: move_def.name.clone(),
                permutation,
                order,
            });
        }

        Ok(Self {
            name: move_set_def.name.clone(),
            facelet_count: move_set_def.facelet_count,
            moves: moves.into_boxed_slice(),
        })
    }

    /// The reference pyraminx table.
    ///
    /// # Errors
    ///
    /// Never in practice; `PYRAMINX` is a valid definition.
    pub fn pyraminx() -> Result<Self, MoveTableError> {
        Self::new(&PYRAMINX)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn facelet_count(&self) -> usize {
        self.facelet_count
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn find_move(&self, name: &str) -> Option<&Move> {
        self.moves.iter().find(|move_| move_.name == name)
    }

    /// # Errors
    ///
    /// `UnknownMove` if no move is called `name`.
    pub fn get(&self, name: &str) -> Result<&Move, MoveTableError> {
        self.find_move(name)
            .ok_or_else(|| MoveTableError::UnknownMove(name.to_owned()))
    }

    /// Keep only the named moves, in the order given.
    ///
    /// # Errors
    ///
    /// `UnknownMove` if a name is not in the table, `DuplicateMove` if a name
    /// is given twice.
    pub fn with_moves(&self, names: &[&str]) -> Result<Self, MoveTableError> {
        if let Some(name) = names.iter().duplicates().next() {
            return Err(MoveTableError::DuplicateMove((*name).to_owned()));
        }
        let moves = names
            .iter()
            .map(|name| self.get(name).cloned())
            .collect::<Result<Box<[Move]>, _>>()?;
        Ok(Self {
            name: self.name.clone(),
            facelet_count: self.facelet_count,
            moves,
        })
    }

    /// Drop moves that never change a state.
    #[must_use]
    pub fn without_identity_moves(&self) -> Self {
        Self {
            name: self.name.clone(),
            facelet_count: self.facelet_count,
            moves: self
                .moves
                .iter()
                .filter(|move_| !move_.is_identity())
                .cloned()
                .collect(),
        }
    }

    /// Resolve a solution token such as `t` or `rr` into a move and the
    /// number of times it is applied. No move name repeats another, so at
    /// most one move matches.
    ///
    /// # Errors
    ///
    /// `InvalidToken` if the token is not a known move repeated.
    pub fn resolve_token(&self, token: &str) -> Result<(&Move, usize), MoveTableError> {
        self.moves
            .iter()
            .find_map(|move_| {
                repetitions(token, &move_.name)
                    .filter(|&power| power > 0)
                    .map(|power| (move_, power))
            })
            .ok_or_else(|| MoveTableError::InvalidToken(token.to_owned()))
    }

    /// Apply a whitespace separated token sequence to a copy of `state`.
    ///
    /// # Errors
    ///
    /// If a token cannot be resolved or the state has the wrong length.
    pub fn apply_tokens(&self, state: &StateVector, tokens: &str) -> Result<StateVector, ApplyError> {
        let mut state = state.clone();
        let mut scratch = Vec::with_capacity(state.len());
        for token in tokens.split_whitespace() {
            let (move_, power) = self.resolve_token(token)?;
            for _ in 0..power {
                state.permute_in_place(move_.permutation(), &mut scratch)?;
            }
        }
        Ok(state)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApplyError {
    #[error(transparent)]
    MoveTable(#[from] MoveTableError),
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatch),
}

impl std::fmt::Display for MoveTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} facelets): {}",
            self.name,
            self.facelet_count,
            self.moves
                .iter()
                .map(|move_| format!("{} (order {})", move_.name, move_.order))
                .join(", ")
        )
    }
}
