//! Dependency-update propagation
//!
//! A release of one module forces a release of every module that requires
//! it, directly or transitively. Propagation runs over the inverse require
//! graph (`D → M` when `M` requires `D`) with a FIFO worklist.

use super::module::{Module, ModuleChange};
use crate::core::error::{ConfigError, RailResult};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Inverse require graph over the discovered modules
///
/// Requirements on modules outside the repository are not represented.
pub struct InverseDependencyGraph {
  graph: DiGraph<String, ()>,
  index: BTreeMap<String, NodeIndex>,
}

impl InverseDependencyGraph {
  /// Build from modules keyed by declared module path
  pub fn build(modules: &BTreeMap<String, Module>) -> Self {
    let mut graph = DiGraph::new();
    let mut index = BTreeMap::new();

    for module_path in modules.keys() {
      index.insert(module_path.clone(), graph.add_node(module_path.clone()));
    }

    for (module_path, module) in modules {
      let dependent = index[module_path];
      for required in &module.requires {
        if required == module_path {
          continue;
        }
        if let Some(&dependency) = index.get(required) {
          graph.add_edge(dependency, dependent, ());
        }
      }
    }

    Self { graph, index }
  }

  /// Modules that directly require `module_path`, sorted
  pub fn dependents(&self, module_path: &str) -> Vec<&str> {
    self
      .index
      .get(module_path)
      .map(|&node| {
        let mut names: Vec<&str> = self
          .graph
          .neighbors_directed(node, Direction::Outgoing)
          .map(|n| self.graph[n].as_str())
          .collect();
        names.sort_unstable();
        names
      })
      .unwrap_or_default()
  }

  fn has_dependents(&self, node: NodeIndex) -> bool {
    self.graph.neighbors_directed(node, Direction::Outgoing).next().is_some()
  }
}

/// Mark every transitive dependent of a changed module with `DEPENDENCY_UPDATE`
///
/// Fails when a module configured with `no_tag` is required by any other
/// discovered module, whether or not it changed.
pub fn calculate_dependency_updates(modules: &mut BTreeMap<String, Module>) -> RailResult<()> {
  let graph = InverseDependencyGraph::build(modules);
  let mut changes: BTreeMap<&str, ModuleChange> = modules.iter().map(|(k, m)| (k.as_str(), m.changes)).collect();

  // Node indices follow the sorted module order.
  let mut queue: VecDeque<NodeIndex> = graph
    .graph
    .node_indices()
    .filter(|&n| graph.has_dependents(n))
    .collect();
  let mut queued: HashSet<NodeIndex> = queue.iter().copied().collect();

  while let Some(current) = queue.pop_front() {
    queued.remove(&current);
    let name = graph.graph[current].as_str();
    let dependents = graph.dependents(name);

    if let Some(module) = modules.get(name)
      && module.config.no_tag
      && !dependents.is_empty()
    {
      return Err(
        ConfigError::NoTagHasDependents {
          module: name.to_string(),
          dependents: dependents.iter().map(|d| d.to_string()).collect(),
        }
        .into(),
      );
    }

    if changes.get(name).is_none_or(|c| c.is_empty()) {
      continue;
    }

    for dependent in dependents {
      let Some(change) = changes.get_mut(dependent) else {
        continue;
      };
      if change.has_dependency_update() {
        continue;
      }
      change.insert(ModuleChange::DEPENDENCY_UPDATE);
      debug!(module = dependent, dependency = name, "dependency update");

      if let Some(&node) = graph.index.get(dependent)
        && graph.has_dependents(node)
        && queued.insert(node)
      {
        queue.push_back(node);
      }
    }
  }

  let updated: Vec<(String, ModuleChange)> = changes.into_iter().map(|(k, c)| (k.to_string(), c)).collect();
  for (module_path, change) in updated {
    if let Some(module) = modules.get_mut(&module_path) {
      module.changes = change;
    }
  }

  Ok(())
}
