use crate::moves::Permutation;
use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The number of facelets on one triangular face.
pub const FACELETS_PER_FACE: usize = 7;
/// The number of faces on the puzzle.
pub const FACE_COUNT: usize = 4;
/// The length of every state vector of the reference puzzle.
pub const FACELET_COUNT: usize = FACELETS_PER_FACE * FACE_COUNT;
/// Faces in state vector order. The bottom face is the one the `t` rotation
/// spins in place.
pub const FACE_NAMES: [&str; FACE_COUNT] = ["front", "right", "left", "bottom"];

/// The label of a single facelet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Yellow = 1,
    Green = 2,
    Blue = 3,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateParseError {
    #[error("Unknown color `{0}`, expected one of red, yellow, green, blue")]
    InvalidColor(String),
    #[error("A state must contain at least one facelet")]
    Empty,
}

impl FromStr for Color {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "r" | "red" => Ok(Color::Red),
            "y" | "yellow" => Ok(Color::Yellow),
            "g" | "green" => Ok(Color::Green),
            "b" | "blue" => Ok(Color::Blue),
            _ => Err(StateParseError::InvalidColor(s.to_owned())),
        }
    }
}

/// Raised when a state and a permutation (or two states) disagree on the
/// number of facelets.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[error("Shape mismatch, expected {expected} facelets but got {actual}")]
pub struct ShapeMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl ShapeMismatch {
    /// Succeeds when `actual == expected`.
    ///
    /// # Errors
    ///
    /// When the two lengths differ.
    pub fn check(expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(ShapeMismatch { expected, actual })
        }
    }
}

/// An ordered sequence of facelet colors. Face `f` occupies positions
/// `f * 7..f * 7 + 7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateVector {
    facelets: Box<[Color]>,
}

/// Collision-free encoding of a [`StateVector`] used as the visited index
/// key. Colors are packed two bits each, four to a byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    len: usize,
    packed: Box<[u8]>,
}

impl StateVector {
    #[must_use]
    pub fn new(facelets: Vec<Color>) -> Self {
        Self {
            facelets: facelets.into_boxed_slice(),
        }
    }

    /// The solved configuration of the reference puzzle: each face a single
    /// color, in the order red, yellow, green, blue.
    #[must_use]
    pub fn solved() -> Self {
        Self::new(
            Color::ALL
                .iter()
                .flat_map(|&color| std::iter::repeat_n(color, FACELETS_PER_FACE))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facelets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facelets.is_empty()
    }

    #[must_use]
    pub fn facelets(&self) -> &[Color] {
        &self.facelets
    }

    /// The seven facelets of face `face_index`, or `None` if the face does
    /// not exist.
    #[must_use]
    pub fn face(&self, face_index: usize) -> Option<&[Color]> {
        let start = face_index.checked_mul(FACELETS_PER_FACE)?;
        self.facelets
            .get(start..start.checked_add(FACELETS_PER_FACE)?)
    }

    pub fn faces(&self) -> impl Iterator<Item = &[Color]> {
        self.facelets.chunks(FACELETS_PER_FACE)
    }

    /// Apply `permutation`, returning the next configuration where
    /// `next[i] = self[permutation[i]]`.
    ///
    /// # Errors
    ///
    /// If the permutation does not act on the same number of facelets.
    pub fn permuted(&self, permutation: &Permutation) -> Result<Self, ShapeMismatch> {
        ShapeMismatch::check(self.len(), permutation.len())?;
        Ok(Self::new(
            permutation
                .indices()
                .iter()
                .map(|&index| self.facelets[index])
                .collect(),
        ))
    }

    /// Apply `permutation` in place. `scratch` is reused between calls so the
    /// search never allocates while descending.
    ///
    /// # Errors
    ///
    /// If the permutation does not act on the same number of facelets.
    pub fn permute_in_place(
        &mut self,
        permutation: &Permutation,
        scratch: &mut Vec<Color>,
    ) -> Result<(), ShapeMismatch> {
        ShapeMismatch::check(self.len(), permutation.len())?;
        self.permute_in_place_unchecked(permutation, scratch);
        Ok(())
    }

    /// [`Self::permute_in_place`] for callers that already checked the
    /// lengths agree.
    pub(crate) fn permute_in_place_unchecked(
        &mut self,
        permutation: &Permutation,
        scratch: &mut Vec<Color>,
    ) {
        debug_assert_eq!(self.len(), permutation.len());
        scratch.clear();
        scratch.extend_from_slice(&self.facelets);
        for (facelet, &index) in self.facelets.iter_mut().zip(permutation.indices()) {
            *facelet = scratch[index];
        }
    }

    #[must_use]
    pub fn encode(&self) -> StateKey {
        let packed = self
            .facelets
            .chunks(4)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0_u8, |byte, (i, &color)| byte | ((color as u8) << (2 * i)))
            })
            .collect();
        StateKey {
            len: self.len(),
            packed,
        }
    }

    /// How many facelets carry each color, indexed like [`Color::ALL`].
    /// Permutations never change this, so two states with different counts
    /// can never reach each other.
    #[must_use]
    pub fn color_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for &color in &self.facelets {
            counts[color as usize] += 1;
        }
        counts
    }
}

impl From<Vec<Color>> for StateVector {
    fn from(facelets: Vec<Color>) -> Self {
        Self::new(facelets)
    }
}

impl FromStr for StateVector {
    type Err = StateParseError;

    /// Parse whitespace or comma separated color names, e.g.
    /// `"red red yellow ..."` or `"r,r,y,..."`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let facelets = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Color>, _>>()?;
        if facelets.is_empty() {
            return Err(StateParseError::Empty);
        }
        Ok(Self::new(facelets))
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces = self.faces().map(|face| face.iter().join(" ")).join(" | ");
        f.write_str(&faces)
    }
}

/// Starting configurations shipped with the reference puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Solved,
    /// A fully mixed configuration.
    Scrambled,
    /// The three upper facelet groups cycled between the front, right and
    /// left faces.
    TopSwap,
}

impl Preset {
    #[must_use]
    pub fn state(self) -> StateVector {
        use Color::{Blue as B, Green as G, Red as R, Yellow as Y};

        match self {
            Preset::Solved => StateVector::solved(),
            Preset::Scrambled => StateVector::new(vec![
                R, Y, B, B, R, G, G, //
                Y, G, B, B, Y, B, Y, //
                G, G, Y, Y, B, R, G, //
                B, R, R, Y, G, R, R, //
            ]),
            Preset::TopSwap => StateVector::new(vec![
                R, Y, Y, Y, R, R, R, //
                Y, G, G, G, Y, Y, Y, //
                G, R, R, R, G, G, G, //
                B, B, B, B, B, B, B, //
            ]),
        }
    }
}
