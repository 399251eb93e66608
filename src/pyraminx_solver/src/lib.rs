#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::module_name_repetitions)]

pub mod facelets;
pub mod moves;
pub mod puzzle;
pub mod solver;
pub mod visited;

pub use facelets::{Color, StateVector};
pub use moves::{Move, MoveTable, PYRAMINX};
pub use puzzle::Puzzle;
pub use solver::{SearchEngine, SearchOutcome, SearchReport, Solution};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}
