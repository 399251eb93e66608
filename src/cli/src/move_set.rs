use color_eyre::eyre::{WrapErr, eyre};
use pyraminx_solver::{
    MoveTable, StateVector,
    facelets::FACELET_COUNT,
    moves::{MoveDef, MoveSetDef},
};
use serde::Deserialize;
use std::path::Path;

/// A move set file, e.g.
///
/// ```toml
/// name = "pyraminx"
/// goal = "red red red red red red red yellow ..."
///
/// [[moves]]
/// name = "r"
/// permutation = [0, 22, 2, 3, 4, 26, 27, ...]
/// ```
///
/// `goal` defaults to the reference solved state.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct MoveSetConfig {
    name: String,
    goal: Option<String>,
    moves: Vec<MoveConfig>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct MoveConfig {
    name: String,
    permutation: Vec<usize>,
}

/// Read a move set file and build its table and goal.
pub fn load(path: &Path) -> color_eyre::Result<(MoveTable, StateVector)> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read the move set file {}", path.display()))?;
    parse(&text).wrap_err_with(|| format!("Invalid move set file {}", path.display()))
}

fn parse(text: &str) -> color_eyre::Result<(MoveTable, StateVector)> {
    let config: MoveSetConfig = toml::from_str(text)?;
    let goal = match &config.goal {
        Some(goal) => goal.parse::<StateVector>()?,
        None => StateVector::solved(),
    };
    if config.moves.is_empty() {
        return Err(eyre!("The move set `{}` declares no moves", config.name));
    }
    let move_set_def = MoveSetDef {
        name: config.name,
        facelet_count: goal.len(),
        moves: config
            .moves
            .into_iter()
            .map(|move_config| MoveDef {
                name: move_config.name,
                permutation: move_config.permutation,
            })
            .collect(),
    };
    if goal.len() != FACELET_COUNT {
        log::info!(
            "Move set `{}` acts on {} facelets",
            move_set_def.name,
            goal.len()
        );
    }
    Ok((MoveTable::new(&move_set_def)?, goal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_custom_move_set() {
        let (table, goal) = parse(
            r#"
            name = "square"
            goal = "r y g b"

            [[moves]]
            name = "a"
            permutation = [1, 0, 2, 3]

            [[moves]]
            name = "c"
            permutation = [1, 2, 3, 0]
            "#,
        )
        .unwrap();
        assert_eq!(table.name(), "square");
        assert_eq!(table.facelet_count(), 4);
        assert_eq!(goal.len(), 4);
        assert_eq!(table.get("c").unwrap().order(), 4);
    }

    #[test]
    fn rejects_bad_move_sets() {
        assert!(parse("name = \"empty\"\nmoves = []").is_err());
        assert!(
            parse(
                r#"
                name = "short"
                [[moves]]
                name = "a"
                permutation = [1, 0]
                "#
            )
            .is_err()
        );
        assert!(parse("name = \"x\"\nmoves = []\ncolour = 1").is_err());
    }
}
