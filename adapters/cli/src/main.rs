#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Crossroads Defence engine.

mod config;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossroads_defence_core::{GridCoord, Route, StructureKind};
use crossroads_defence_system_builder::{CommitOutcome, PlacementSession, ResourceLedger};
use crossroads_defence_world::{query, OccupancyRule, Router, World};
use tracing::info;

use crate::config::EconomyConfig;

/// Command-line arguments for the Crossroads Defence engine.
#[derive(Debug, Parser)]
#[command(name = "crossroads-defence", version, about)]
struct CliArgs {
    /// Path to a TOML match configuration.
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Action to perform. Prints the map when omitted.
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print the generated terrain.
    Map,
    /// Compute a route between two cells and draw it on the map.
    Route {
        /// Start cell as `x,y`.
        #[arg(long, value_parser = parse_cell)]
        from: GridCoord,
        /// Goal cell as `x,y`.
        #[arg(long, value_parser = parse_cell)]
        to: GridCoord,
        /// Treat cells holding structures as blocked.
        #[arg(long)]
        avoid_structures: bool,
    },
    /// Place structures in order, each as `kind@x,y`, paying from the configured purse.
    Place {
        /// Placement requests such as `barricade@5,8`.
        #[arg(required = true, value_parser = parse_request)]
        requests: Vec<PlacementRequest>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PlacementRequest {
    kind: StructureKind,
    cell: GridCoord,
}

/// Gold purse charged for every committed structure.
#[derive(Clone, Debug)]
struct Treasury {
    gold: u32,
    economy: EconomyConfig,
}

impl Treasury {
    fn new(economy: EconomyConfig) -> Self {
        Self {
            gold: economy.starting_gold,
            economy,
        }
    }
}

impl ResourceLedger for Treasury {
    fn can_afford(&self, kind: StructureKind) -> bool {
        self.gold >= self.economy.cost_of(kind)
    }

    fn charge(&mut self, kind: StructureKind) {
        self.gold = self.gold.saturating_sub(self.economy.cost_of(kind));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = CliArgs::parse();
    let match_config = config::load(args.config.as_deref())?;
    let mut world =
        World::generate(&match_config.grid).context("failed to generate match terrain")?;
    println!("{}", query::welcome_banner(&world));

    match args.action.unwrap_or(Action::Map) {
        Action::Map => print_map(&world, None),
        Action::Route {
            from,
            to,
            avoid_structures,
        } => {
            let rule = if avoid_structures {
                OccupancyRule::Avoid
            } else {
                OccupancyRule::Ignore
            };
            let route = Router::new(rule).find_path(query::grid(&world), from, to);
            if route.is_empty() {
                println!("no route from {from} to {to}");
            } else {
                println!("route from {from} to {to}: {} hops", route.hop_count());
            }
            print_map(&world, Some(&route));
        }
        Action::Place { requests } => {
            let mut treasury = Treasury::new(match_config.economy);
            let outcomes = place_all(&mut world, &mut treasury, &requests);
            for (request, outcome) in requests.iter().zip(&outcomes) {
                println!("{}@{}: {}", request.kind, request.cell, describe(outcome));
            }
            println!("gold remaining: {}", treasury.gold);
            print_map(&world, None);
        }
    }

    Ok(())
}

fn print_map(world: &World, route: Option<&Route>) {
    print!("{}", render::render(world, route));
    println!("{}", render::legend());
}

/// Runs one placement session per request, moving the cursor to the centre of
/// the requested cell before committing.
fn place_all<L>(
    world: &mut World,
    ledger: &mut L,
    requests: &[PlacementRequest],
) -> Vec<CommitOutcome>
where
    L: ResourceLedger + ?Sized,
{
    let mut session = PlacementSession::new();
    let mut events = Vec::new();
    requests
        .iter()
        .map(|request| {
            session.begin_placement(request.kind);
            let position = query::grid(world).grid_to_world(request.cell);
            let _ = session.update_cursor(world, position);
            let outcome = session.commit(world, ledger, &mut events);
            if !outcome.is_placed() {
                let _ = session.cancel();
            }
            info!(kind = %request.kind, cell = %request.cell, ?outcome, "placement processed");
            outcome
        })
        .collect()
}

fn describe(outcome: &CommitOutcome) -> String {
    match outcome {
        CommitOutcome::Placed(structure) => format!("placed as {structure:?}"),
        CommitOutcome::NotPreviewing => "no placement in progress".to_owned(),
        CommitOutcome::Invalid => "cell cannot hold this structure".to_owned(),
        CommitOutcome::Unaffordable => "not enough gold".to_owned(),
        CommitOutcome::Rejected(reason) => format!("rejected: {reason}"),
    }
}

fn parse_cell(value: &str) -> Result<GridCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid y coordinate `{y}`: {error}"))?;
    Ok(GridCoord::new(x, y))
}

fn parse_request(value: &str) -> Result<PlacementRequest, String> {
    let (kind, cell) = value
        .split_once('@')
        .ok_or_else(|| format!("expected `kind@x,y`, got `{value}`"))?;
    let kind = kind.parse::<StructureKind>().map_err(|error| error.to_string())?;
    Ok(PlacementRequest {
        kind,
        cell: parse_cell(cell)?,
    })
}
