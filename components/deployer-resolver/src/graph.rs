use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::UnresolvedImportError;
use crate::registry::ContractRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNode {
    /// Import location -> registration index of the contract it resolves to.
    pub dependencies: BTreeMap<String, usize>,
}

/// Dependency graph over registration indexes. An edge `a -> b` means `a`
/// must be deployed before `b`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    adjacency_list: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> usize {
        self.nodes.push(GraphNode::default());
        self.adjacency_list.push(vec![]);
        self.nodes.len() - 1
    }

    /// Records that `dependent` imports `location`, resolved to `dependency`.
    /// Importing the same location twice keeps a single edge.
    pub fn add_dependency(&mut self, dependent: usize, location: &str, dependency: usize) {
        let node = &mut self.nodes[dependent];
        if node.dependencies.contains_key(location) {
            return;
        }
        node.dependencies.insert(location.to_string(), dependency);
        let list = &mut self.adjacency_list[dependency];
        if !list.contains(&dependent) {
            list.push(dependent);
        }
    }

    pub fn node(&self, index: usize) -> &GraphNode {
        &self.nodes[index]
    }

    /// Contracts that depend on `index`, in the order edges were added.
    pub fn get_node_descendants(&self, index: usize) -> &[usize] {
        &self.adjacency_list[index]
    }

    pub fn has_edge(&self, src: usize, dst: usize) -> bool {
        self.adjacency_list[src].contains(&dst)
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges_count(&self) -> usize {
        self.adjacency_list.iter().map(|list| list.len()).sum()
    }
}

/// Resolves every import of every registered contract. The first import that
/// does not match a registered location aborts the build.
pub fn build_dependency_graph(
    registry: &ContractRegistry,
) -> Result<DependencyGraph, UnresolvedImportError> {
    let mut graph = DependencyGraph::new();
    for _ in registry.contracts() {
        graph.add_node();
    }

    for contract in registry.contracts() {
        for location in contract.imports.iter() {
            let dependency = match registry.lookup(location) {
                Some(dependency) => dependency,
                None => {
                    return Err(UnresolvedImportError {
                        contract_name: contract.name().to_string(),
                        import_path: location.clone(),
                    })
                }
            };
            graph.add_dependency(contract.index, location, dependency.index);
        }
    }

    debug!(
        "dependency graph built: {} contract(s), {} edge(s)",
        graph.nodes_count(),
        graph.edges_count()
    );
    Ok(graph)
}
