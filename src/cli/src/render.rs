use owo_colors::OwoColorize;
use pyraminx_solver::{
    Color, StateVector,
    facelets::{FACE_NAMES, FACELETS_PER_FACE},
    solver::SearchStats,
};
use itertools::Itertools;

fn facelet(color: Color) -> String {
    match color {
        Color::Red => "■".red().to_string(),
        Color::Yellow => "■".yellow().to_string(),
        Color::Green => "■".green().to_string(),
        Color::Blue => "■".blue().to_string(),
    }
}

/// One line per face with a colored square for every facelet. States of
/// custom move sets are cut into faces of the same size.
pub fn faces(state: &StateVector) -> String {
    let mut lines = state
        .faces()
        .enumerate()
        .map(|(i, face)| {
            let name = FACE_NAMES.get(i).copied().unwrap_or("extra");
            format!("{name:>7} {}", face.iter().map(|&color| facelet(color)).join(" "))
        })
        .collect_vec();
    if state.len() % FACELETS_PER_FACE != 0 {
        lines.push("(partial last face)".dimmed().to_string());
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn stats(stats: &SearchStats) -> String {
    format!(
        "{} nodes visited, {} states expanded, {} distinct, {} memo prunes, {} depth cutoffs",
        stats.nodes_visited,
        stats.states_expanded,
        stats.distinct_states,
        stats.memo_prunes,
        stats.depth_cutoffs
    )
}
