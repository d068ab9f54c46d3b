//! Match configuration loaded from TOML.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use crossroads_defence_core::StructureKind;
use crossroads_defence_world::GridConfig;
use serde::Deserialize;

const DEFAULT_STARTING_GOLD: u32 = 200;

/// Settings for a single match. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MatchConfig {
    /// Terrain generation parameters.
    pub(crate) grid: GridConfig,
    /// Starting funds and structure prices.
    pub(crate) economy: EconomyConfig,
}

/// Funds available to the player and the price of each structure kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EconomyConfig {
    /// Gold held when the match starts.
    pub(crate) starting_gold: u32,
    /// Price overrides keyed by structure name.
    pub(crate) costs: BTreeMap<StructureKind, u32>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: DEFAULT_STARTING_GOLD,
            costs: BTreeMap::new(),
        }
    }
}

impl EconomyConfig {
    /// Price of `kind`, falling back to the built-in table.
    pub(crate) fn cost_of(&self, kind: StructureKind) -> u32 {
        self.costs
            .get(&kind)
            .copied()
            .unwrap_or_else(|| default_cost(kind))
    }
}

fn default_cost(kind: StructureKind) -> u32 {
    match kind {
        StructureKind::ArrowTower => 50,
        StructureKind::Barricade => 20,
        StructureKind::Watchpost => 40,
        StructureKind::Dock => 60,
        StructureKind::Outpost => 80,
    }
}

/// Parses a configuration document.
pub(crate) fn parse(contents: &str) -> Result<MatchConfig> {
    toml::from_str(contents).context("failed to parse match configuration toml contents")
}

/// Loads the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read match configuration {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid match configuration {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossroads_defence_core::CellType;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse("").expect("empty config parses");
        assert_eq!(config, MatchConfig::default());
        assert_eq!(config.grid.width, 20);
        assert_eq!(config.economy.starting_gold, DEFAULT_STARTING_GOLD);
    }

    #[test]
    fn populated_document_overrides_defaults() {
        let config = parse(
            r#"
            [grid]
            width = 12
            height = 9
            cell_size = 32.0
            road_columns = [3, 8]

            [[grid.overrides]]
            x = 4
            y = 4
            cell_type = "Buildable"

            [economy]
            starting_gold = 75

            [economy.costs]
            barricade = 5
            "#,
        )
        .expect("config parses");

        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.height, 9);
        assert_eq!(config.grid.cell_size, 32.0);
        assert_eq!(config.grid.road_columns, Some(vec![3, 8]));
        assert_eq!(config.grid.road_rows, None);
        assert_eq!(config.grid.overrides.len(), 1);
        assert_eq!(config.grid.overrides[0].cell_type, CellType::Buildable);
        assert_eq!(config.economy.starting_gold, 75);
        assert_eq!(config.economy.cost_of(StructureKind::Barricade), 5);
        assert_eq!(config.economy.cost_of(StructureKind::ArrowTower), 50);
    }

    #[test]
    fn unknown_structure_names_are_rejected() {
        let error = parse("[economy.costs]\ncatapult = 3\n").expect_err("unknown kind");
        assert!(format!("{error:#}").contains("catapult"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = load(Some(Path::new("does/not/exist.toml"))).expect_err("missing file");
        assert!(format!("{error:#}").contains("does/not/exist.toml"));
    }
}
