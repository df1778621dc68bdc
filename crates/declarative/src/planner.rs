//! Execution planner - orders declarations into apply waves
//!
//! Every declaration in wave N depends only on declarations in waves 0..N-1,
//! so members of a wave can be provisioned in parallel. Teardown walks the
//! waves in reverse.

use crate::error::{Error, Result};
use crate::graph::StackGraph;
use std::collections::{BTreeSet, HashSet};

/// A group of declarations whose dependencies are all in earlier waves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wave {
    pub names: Vec<String>,
}

impl Wave {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Ordered apply waves for a stack graph
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    waves: Vec<Wave>,
}

impl ExecutionPlan {
    /// Compute the plan using Kahn's algorithm
    ///
    /// 1. Collect every unplaced node whose dependencies are all placed
    /// 2. Emit them as one wave, in declaration order
    /// 3. Repeat until every node is placed
    ///
    /// A round that places nothing means the remaining nodes form a cycle.
    pub fn from_graph(graph: &StackGraph) -> Result<Self> {
        let total = graph.len();
        let mut placed: HashSet<&str> = HashSet::with_capacity(total);
        let mut waves = Vec::new();

        while placed.len() < total {
            let wave = Wave {
                names: graph
                    .declarations()
                    .iter()
                    .filter(|d| !placed.contains(d.name.as_str()))
                    .filter(|d| d.dependencies().iter().all(|dep| placed.contains(dep)))
                    .map(|d| d.name.clone())
                    .collect(),
            };

            if wave.is_empty() {
                let stuck = graph
                    .declarations()
                    .iter()
                    .filter(|d| !placed.contains(d.name.as_str()))
                    .map(|d| d.name.clone())
                    .collect();
                return Err(Error::Cycle(stuck));
            }

            log::debug!("Computed wave {} with {} declarations", waves.len(), wave.len());

            for name in &wave.names {
                if let Some(decl) = graph.get(name) {
                    placed.insert(decl.name.as_str());
                }
            }
            waves.push(wave);
        }

        log::info!(
            "Computed plan: {} declarations in {} waves",
            total,
            waves.len()
        );
        Ok(Self { waves })
    }

    /// Restrict the plan to `target` and everything it depends on
    pub fn filter_by_target(self, graph: &StackGraph, target: Option<&str>) -> Result<Self> {
        let Some(target) = target else {
            return Ok(self);
        };
        Ok(self.retain(&graph.closure(target)?))
    }

    /// Restrict the plan to `target` and everything that depends on it
    ///
    /// Removing `target` means removing its dependents first, so this is the
    /// set a targeted teardown walks.
    pub fn filter_for_teardown(self, graph: &StackGraph, target: Option<&str>) -> Result<Self> {
        let Some(target) = target else {
            return Ok(self);
        };
        Ok(self.retain(&graph.dependent_closure(target)?))
    }

    fn retain(self, keep: &BTreeSet<String>) -> Self {
        let waves = self
            .waves
            .into_iter()
            .map(|w| Wave {
                names: w.names.into_iter().filter(|n| keep.contains(n)).collect(),
            })
            .filter(|w| !w.is_empty())
            .collect();
        Self { waves }
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Flattened apply order
    pub fn order(&self) -> Vec<&str> {
        self.waves
            .iter()
            .flat_map(|w| w.names.iter().map(String::as_str))
            .collect()
    }

    /// Flattened teardown order (dependents before their dependencies)
    pub fn teardown_order(&self) -> Vec<&str> {
        self.waves
            .iter()
            .rev()
            .flat_map(|w| w.names.iter().map(String::as_str))
            .collect()
    }

    /// Wave index a declaration lands in
    pub fn wave_of(&self, name: &str) -> Option<usize> {
        self.waves
            .iter()
            .position(|w| w.names.iter().any(|n| n == name))
    }

    pub fn total(&self) -> usize {
        self.waves.iter().map(Wave::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}
