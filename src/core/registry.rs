//! Name → strategy factory lookup used by the driver, harness and hosts.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::strategies::backtracker::Backtracker;
use crate::strategies::composite::{Phased, PhasedConfig, Rotating, RotatingConfig};
use crate::strategies::dead_end_filling::DeadEndFilling;
use crate::strategies::flood_fill::FloodFill;
use crate::strategies::graph_search::GraphSearch;
use crate::strategies::pledge::Pledge;
use crate::strategies::random::RandomMouse;
use crate::strategies::replay::{Replay, ReplayStep};
use crate::strategies::scripted::{Command, Scripted};
use crate::strategies::tremaux::Tremaux;
use crate::strategies::wall_follower::{Hand, WallFollower};
use crate::strategies::{Strategy, StrategyState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Inputs some strategies need at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrategyOptions {
    /// Seed for randomized strategies.
    pub seed: u64,
    /// Command queue for `manual-input`.
    pub script: Vec<Command>,
    /// Recorded stream for `log-playback`.
    pub replay: Vec<ReplayStep>,
    pub phased: PhasedConfig,
    pub rotating: RotatingConfig,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            script: Vec::new(),
            replay: Vec::new(),
            phased: PhasedConfig::default(),
            rotating: RotatingConfig::default(),
        }
    }
}

impl StrategyOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_script(mut self, script: Vec<Command>) -> Self {
        self.script = script;
        self
    }

    pub fn with_replay(mut self, replay: Vec<ReplayStep>) -> Self {
        self.replay = replay;
        self
    }

    pub fn with_phased(mut self, phased: PhasedConfig) -> Self {
        self.phased = phased;
        self
    }

    pub fn with_rotating(mut self, rotating: RotatingConfig) -> Self {
        self.rotating = rotating;
        self
    }
}

pub type Factory = fn(&StrategyOptions) -> StrategyState;

#[derive(Debug, Clone)]
pub struct StrategyEntry {
    pub name: String,
    pub description: String,
    factory: Factory,
}

impl StrategyEntry {
    pub fn build(&self, opts: &StrategyOptions) -> Strategy {
        Strategy::new(self.name.clone(), (self.factory)(opts))
    }
}

/// Ordered registry; iteration follows registration order.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    entries: Vec<StrategyEntry>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut r = Self::empty();
        r.register("left-hand", "Keep the left hand on the wall", |_| {
            StrategyState::WallFollower(WallFollower::new(Hand::Left))
        });
        r.register("right-hand", "Keep the right hand on the wall", |_| {
            StrategyState::WallFollower(WallFollower::new(Hand::Right))
        });
        r.register("forward-first", "Straight ahead, then right, then left", |_| {
            StrategyState::WallFollower(WallFollower::new(Hand::Forward))
        });
        r.register("random-mouse", "Uniform choice among open sides", |o| {
            StrategyState::RandomMouse(RandomMouse::new(o.seed))
        });
        r.register("pledge", "Straight runs plus angle-counted wall following", |_| {
            StrategyState::Pledge(Pledge::new())
        });
        r.register("tremaux", "Passage marking, never a third time", |_| {
            StrategyState::Tremaux(Tremaux::new())
        });
        r.register("breadth-first-search", "Level-order search tree", |_| {
            StrategyState::GraphSearch(GraphSearch::breadth_first())
        });
        r.register("depth-first-search", "Deepest-first search tree", |_| {
            StrategyState::GraphSearch(GraphSearch::depth_first())
        });
        r.register("recursive-backtrack", "Descend, backtrack by bearing", |_| {
            StrategyState::Backtracker(Backtracker::new())
        });
        r.register("flood-fill", "Greedy descent on distance to exit", |_| {
            StrategyState::FloodFill(FloodFill::new())
        });
        r.register("dead-end-filling", "Fill dead-end branches, walk the rest", |_| {
            StrategyState::DeadEndFilling(DeadEndFilling::new())
        });
        r.register("hybrid-explorer", "Right-hand scan, left-hand sweep, Tremaux", |o| {
            StrategyState::Phased(Phased::hybrid(o.phased))
        });
        r.register("adaptive-hunter", "Rotate followers on stalls, home when done", |o| {
            StrategyState::Rotating(Rotating::adaptive_hunter(o.rotating))
        });
        r.register("manual-input", "Queued F/L/R/U commands", |o| {
            StrategyState::Scripted(Scripted::new(o.script.clone()))
        });
        r.register("log-playback", "Replay a recorded trace", |o| {
            StrategyState::Replay(Replay::new(o.replay.clone()))
        });
        r
    }

    /// Adds `name`, replacing any entry already registered under it.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        factory: Factory,
    ) {
        let entry = StrategyEntry {
            name: name.into(),
            description: description.into(),
            factory,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&StrategyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// A fresh instance with its own state.
    pub fn create(&self, name: &str, opts: &StrategyOptions) -> Result<Strategy, RegistryError> {
        self.get(name)
            .map(|e| e.build(opts))
            .ok_or_else(|| RegistryError::UnknownStrategy(name.to_string()))
    }
}
