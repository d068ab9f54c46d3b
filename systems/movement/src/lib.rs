#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy-side route consumption.
//!
//! The [`Navigator`] asks the injected [`Router`] for a route when an enemy is
//! tracked and walks the enemy along its waypoints. Whether a route is ever
//! recomputed afterwards is an explicit [`ReplanPolicy`]; with
//! [`ReplanPolicy::OneShot`] routes go stale when structures appear or vanish.
//! An enemy without a route heads for its goal in a straight line.

use std::collections::{btree_map::Entry, BTreeMap};

use crossroads_defence_core::{EnemyId, Event, GridCoord, Route};
use crossroads_defence_world::{Grid, Router};
use glam::Vec2;
use tracing::debug;

/// When tracked enemies request a fresh route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReplanPolicy {
    /// Route once when tracking starts and never again.
    #[default]
    OneShot,
    /// Re-route every tracked enemy whenever cell occupancy changes.
    OnOccupancyChange,
}

#[derive(Clone, Debug)]
struct Agent {
    goal: GridCoord,
    goal_position: Vec2,
    position: Vec2,
    route: Route,
    next_waypoint: usize,
    arrived: bool,
}

impl Agent {
    fn target(&self) -> Option<Vec2> {
        if self.arrived {
            return None;
        }
        if self.route.is_empty() {
            return Some(self.goal_position);
        }
        self.route.waypoints().get(self.next_waypoint).copied()
    }

    fn reach_target(&mut self) {
        if self.route.is_empty() {
            self.arrived = true;
            return;
        }
        self.next_waypoint += 1;
        if self.next_waypoint >= self.route.len() {
            self.arrived = true;
        }
    }

    fn assign(&mut self, route: Route) {
        self.route = route;
        self.next_waypoint = 0;
        self.arrived = false;
    }
}

/// Tracks enemies and steers them along routes produced by a [`Router`].
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    router: Router,
    policy: ReplanPolicy,
    agents: BTreeMap<EnemyId, Agent>,
}

impl Navigator {
    /// Creates a navigator that plans with `router` under `policy`.
    #[must_use]
    pub fn new(router: Router, policy: ReplanPolicy) -> Self {
        Self {
            router,
            policy,
            agents: BTreeMap::new(),
        }
    }

    /// Starts tracking `enemy` at `position` and routes it toward `goal`.
    ///
    /// Tracking an enemy again replaces its previous state.
    pub fn track(
        &mut self,
        grid: &Grid,
        enemy: EnemyId,
        position: Vec2,
        goal: GridCoord,
    ) -> &Route {
        let route = self.plan(grid, enemy, position, goal);
        let agent = Agent {
            goal,
            goal_position: grid.grid_to_world(goal),
            position,
            route,
            next_waypoint: 0,
            arrived: false,
        };
        let slot = match self.agents.entry(enemy) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = agent;
                slot
            }
            Entry::Vacant(entry) => entry.insert(agent),
        };
        &slot.route
    }

    /// Stops tracking `enemy`, reporting whether it was tracked.
    pub fn untrack(&mut self, enemy: EnemyId) -> bool {
        self.agents.remove(&enemy).is_some()
    }

    /// Route currently assigned to `enemy`.
    #[must_use]
    pub fn route(&self, enemy: EnemyId) -> Option<&Route> {
        self.agents.get(&enemy).map(|agent| &agent.route)
    }

    /// Current world position of `enemy`.
    #[must_use]
    pub fn position(&self, enemy: EnemyId) -> Option<Vec2> {
        self.agents.get(&enemy).map(|agent| agent.position)
    }

    /// Reports whether `enemy` finished its route or reached its goal.
    #[must_use]
    pub fn has_arrived(&self, enemy: EnemyId) -> bool {
        self.agents.get(&enemy).is_some_and(|agent| agent.arrived)
    }

    /// Number of tracked enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Reports whether no enemy is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Consumes world events, re-routing enemies when the policy asks for it.
    ///
    /// Returns the number of enemies that received a fresh route.
    pub fn handle(&mut self, events: &[Event], grid: &Grid) -> usize {
        if self.policy != ReplanPolicy::OnOccupancyChange
            || !events.iter().any(Event::changes_occupancy)
        {
            return 0;
        }

        let router = self.router;
        let mut replanned = 0;
        for (enemy, agent) in &mut self.agents {
            if agent.arrived {
                continue;
            }
            let start = grid.world_to_grid(agent.position);
            let route = router.find_path(grid, start, agent.goal);
            debug!(?enemy, %start, hops = route.hop_count(), "enemy re-routed");
            agent.assign(route);
            replanned += 1;
        }
        replanned
    }

    /// Moves `enemy` up to `distance` world units along its route.
    ///
    /// Enemies without a route travel straight toward the goal's centre.
    /// Returns the new position, or `None` for untracked enemies.
    pub fn steer(&mut self, enemy: EnemyId, distance: f32) -> Option<Vec2> {
        let agent = self.agents.get_mut(&enemy)?;
        let mut remaining = distance.max(0.0);

        while let Some(target) = agent.target() {
            let offset = target - agent.position;
            let gap = offset.length();
            if gap <= remaining {
                agent.position = target;
                remaining -= gap;
                agent.reach_target();
            } else {
                agent.position += offset / gap * remaining;
                break;
            }
        }

        Some(agent.position)
    }

    fn plan(&self, grid: &Grid, enemy: EnemyId, position: Vec2, goal: GridCoord) -> Route {
        let start = grid.world_to_grid(position);
        let route = self.router.find_path(grid, start, goal);
        if route.is_empty() {
            debug!(?enemy, %start, %goal, "no route; heading straight for the goal");
        } else {
            debug!(?enemy, %start, %goal, hops = route.hop_count(), "route assigned");
        }
        route
    }
}
