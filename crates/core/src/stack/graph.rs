//! Directed acyclic graph of resources (nodes) and "must exist before"
//! edges.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use super::error::GraphError;

/// How an edge came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Declared with `DependsOn`.
    Explicit,
    /// Inferred from a `Ref` / `Fn::GetAtt` in the properties.
    Implicit,
}

/// Resource dependency graph.
///
/// Nodes keep their insertion order so that orderings are deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// node -> (dependency -> kind)
    edges: Vec<BTreeMap<String, EdgeKind>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    pub fn add_resource(&mut self, logical_id: &str) -> Result<(), GraphError> {
        if self.index.contains_key(logical_id) {
            return Err(GraphError::DuplicateResource(logical_id.to_string()));
        }
        self.index.insert(logical_id.to_string(), self.nodes.len());
        self.nodes.push(logical_id.to_string());
        self.edges.push(BTreeMap::new());
        Ok(())
    }

    /// Records that `from` needs `to` to exist first. `to` does not have to
    /// be declared yet; [`validate`](Self::validate) reports dangling edges.
    /// An explicit edge wins over an implicit one between the same nodes.
    pub fn add_dependency(
        &mut self,
        from: &str,
        to: &str,
        kind: EdgeKind,
    ) -> Result<(), GraphError> {
        let idx = *self
            .index
            .get(from)
            .ok_or_else(|| GraphError::UnknownResource(from.to_string()))?;
        let edges = &mut self.edges[idx];
        match edges.get(to) {
            Some(EdgeKind::Explicit) => {}
            _ => {
                edges.insert(to.to_string(), kind);
            }
        }
        Ok(())
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.index.contains_key(logical_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn resources(&self) -> &[String] {
        &self.nodes
    }

    /// Direct dependencies of `logical_id`, sorted by id.
    pub fn dependencies_of(&self, logical_id: &str) -> Result<Vec<(&str, EdgeKind)>, GraphError> {
        let idx = *self
            .index
            .get(logical_id)
            .ok_or_else(|| GraphError::UnknownResource(logical_id.to_string()))?;
        Ok(self.edges[idx]
            .iter()
            .map(|(id, kind)| (id.as_str(), *kind))
            .collect())
    }

    /// Checks there are no dangling edges and no cycles.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.topological_order().map(|_| ())
    }

    /// Orders nodes so every node comes after its dependencies (Kahn's
    /// algorithm). Among nodes that are ready at the same time, the one
    /// inserted first comes first.
    pub fn topological_order(&self) -> Result<Vec<&str>, GraphError> {
        let mut pending = vec![0usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (idx, edges) in self.edges.iter().enumerate() {
            for to in edges.keys() {
                let dep = *self
                    .index
                    .get(to)
                    .ok_or_else(|| GraphError::DanglingReference {
                        from: self.nodes[idx].clone(),
                        to: to.clone(),
                    })?;
                pending[idx] += 1;
                dependents[dep].push(idx);
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.nodes[idx].as_str());
            for &dependent in &dependents[idx] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < self.nodes.len() {
            let stuck = self
                .nodes
                .iter()
                .zip(&pending)
                .filter(|(_, count)| **count > 0)
                .map(|(id, _)| id.clone())
                .collect();
            return Err(GraphError::Cycle(stuck));
        }

        Ok(order)
    }
}
