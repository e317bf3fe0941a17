//! The in-memory stack: resources with their logical ids, explicit
//! dependencies and deletion policies.

use std::collections::BTreeSet;

use serde::Serialize;

use super::assembly::StackConfig;
use super::error::{GraphError, Result, StackError};
use super::expr::collect_references;
use super::graph::{DependencyGraph, EdgeKind};
use super::resources::{Resource, Resolver, Table};

/// What happens to a resource when it is removed from the stack or
/// replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// A resource plus its stack-level attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResource {
    pub logical_id: String,
    pub resource: Resource,
    pub depends_on: Vec<String>,
    pub deletion_policy: Option<DeletionPolicy>,
}

impl StackResource {
    /// Adds an explicit ordering constraint.
    pub fn depends_on(&mut self, logical_id: &str) -> &mut Self {
        if !self.depends_on.iter().any(|d| d == logical_id) {
            self.depends_on.push(logical_id.to_string());
        }
        self
    }

    /// Sets both the deletion and the update-replace policy.
    pub fn with_deletion_policy(&mut self, policy: DeletionPolicy) -> &mut Self {
        self.deletion_policy = Some(policy);
        self
    }

    /// Logical ids referenced from the properties.
    pub fn references(&self) -> Result<BTreeSet<String>> {
        let properties = self
            .resource
            .properties()
            .map_err(|e| StackError::Serialization(e.to_string()))?;
        let mut refs = BTreeSet::new();
        collect_references(&properties, &mut refs);
        Ok(refs)
    }
}

/// An assembled stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    config: StackConfig,
    resources: Vec<StackResource>,
}

impl Stack {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            resources: Vec::new(),
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Adds a resource and returns it for further configuration.
    pub fn add(&mut self, logical_id: &str, resource: Resource) -> Result<&mut StackResource> {
        if self.get(logical_id).is_some() {
            return Err(GraphError::DuplicateResource(logical_id.to_string()).into());
        }
        self.resources.push(StackResource {
            logical_id: logical_id.to_string(),
            resource,
            depends_on: Vec::new(),
            deletion_policy: None,
        });
        let last = self.resources.len() - 1;
        Ok(&mut self.resources[last])
    }

    /// Resources in insertion order.
    pub fn resources(&self) -> &[StackResource] {
        &self.resources
    }

    pub fn get(&self, logical_id: &str) -> Option<&StackResource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    /// All resolver resources.
    pub fn resolvers(&self) -> impl Iterator<Item = (&StackResource, &Resolver)> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::Resolver(resolver) => Some((r, resolver)),
            _ => None,
        })
    }

    /// The first table resource, if any.
    pub fn table(&self) -> Option<(&StackResource, &Table)> {
        self.resources.iter().find_map(|r| match &r.resource {
            Resource::Table(table) => Some((r, table)),
            _ => None,
        })
    }

    /// Builds the dependency graph from explicit `DependsOn` entries and
    /// the references found in each resource's properties.
    pub fn graph(&self) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        for resource in &self.resources {
            graph.add_resource(&resource.logical_id)?;
        }
        for resource in &self.resources {
            for reference in resource.references()? {
                graph.add_dependency(&resource.logical_id, &reference, EdgeKind::Implicit)?;
            }
            for dependency in &resource.depends_on {
                graph.add_dependency(&resource.logical_id, dependency, EdgeKind::Explicit)?;
            }
        }
        Ok(graph)
    }

    /// Validates the graph and returns the resources in creation order.
    pub fn creation_order(&self) -> Result<Vec<&StackResource>> {
        let graph = self.graph()?;
        let order = graph.topological_order()?;
        Ok(order
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect())
    }
}
