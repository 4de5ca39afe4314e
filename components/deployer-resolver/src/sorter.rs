use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unvisited,
    InProgress { index: usize, low_link: usize },
    Resolved,
}

/// Depth-first walk collecting strongly connected components (Tarjan).
struct GraphWalker<'a> {
    graph: &'a DependencyGraph,
    states: Vec<NodeState>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl<'a> GraphWalker<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        Self {
            graph,
            states: vec![NodeState::Unvisited; graph.nodes_count()],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn low_link(&self, node: usize) -> usize {
        match self.states[node] {
            NodeState::InProgress { low_link, .. } => low_link,
            _ => usize::MAX,
        }
    }

    fn lower_link(&mut self, node: usize, candidate: usize) {
        if let NodeState::InProgress { low_link, .. } = &mut self.states[node] {
            if candidate < *low_link {
                *low_link = candidate;
            }
        }
    }

    fn enter(&mut self, node: usize) {
        let index = self.next_index;
        self.next_index += 1;
        self.states[node] = NodeState::InProgress {
            index,
            low_link: index,
        };
        self.stack.push(node);
    }

    fn close(&mut self, node: usize) {
        if let NodeState::InProgress { index, low_link } = self.states[node] {
            if index == low_link {
                let mut component = Vec::new();
                while let Some(member) = self.stack.pop() {
                    self.states[member] = NodeState::Resolved;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                self.components.push(component);
            }
        }
    }

    /// Walks everything reachable from `root`. The path is kept on an
    /// explicit stack of `(node, next descendant position)` so that long
    /// dependency chains do not grow the call stack.
    fn visit(&mut self, root: usize) {
        let graph = self.graph;
        let mut path: Vec<(usize, usize)> = vec![(root, 0)];
        self.enter(root);

        while let Some(&(node, position)) = path.last() {
            let descendants = graph.get_node_descendants(node);
            if let Some(&descendant) = descendants.get(position) {
                let top = path.len() - 1;
                path[top].1 += 1;
                match self.states[descendant] {
                    NodeState::Unvisited => {
                        self.enter(descendant);
                        path.push((descendant, 0));
                    }
                    NodeState::InProgress { index, .. } => {
                        // Back edge into the current path: a cycle boundary.
                        self.lower_link(node, index);
                    }
                    NodeState::Resolved => {}
                }
                continue;
            }

            path.pop();
            let low_link = self.low_link(node);
            self.close(node);
            if let Some(&(parent, _)) = path.last() {
                self.lower_link(parent, low_link);
            }
        }
    }

    fn get_strongly_connected_components(mut self) -> Vec<Vec<usize>> {
        for node in 0..self.graph.nodes_count() {
            if self.states[node] == NodeState::Unvisited {
                self.visit(node);
            }
        }
        self.components
    }
}

/// Returns every cycle of the graph: components with more than one node and
/// single nodes depending on themselves. Members are sorted by index and
/// cycles by their first member.
pub fn get_cycling_dependencies(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    let mut cycles: Vec<Vec<usize>> = GraphWalker::new(graph)
        .get_strongly_connected_components()
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.has_edge(component[0], component[0])
        })
        .map(|mut component| {
            component.sort_unstable();
            component
        })
        .collect();
    cycles.sort_unstable_by_key(|cycle| cycle[0]);
    cycles
}

/// Topological order of the graph where nodes without a constraint between
/// them come out by ascending index. Fails with the full list of cycles.
pub fn get_sorted_dependencies(graph: &DependencyGraph) -> Result<Vec<usize>, Vec<Vec<usize>>> {
    let cycles = get_cycling_dependencies(graph);
    if !cycles.is_empty() {
        return Err(cycles);
    }

    let mut in_degree = vec![0usize; graph.nodes_count()];
    for node in 0..graph.nodes_count() {
        for &descendant in graph.get_node_descendants(node) {
            in_degree[descendant] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(node, _)| Reverse(node))
        .collect();

    let mut sorted_indexes = Vec::with_capacity(graph.nodes_count());
    while let Some(Reverse(node)) = ready.pop() {
        sorted_indexes.push(node);
        for &descendant in graph.get_node_descendants(node) {
            in_degree[descendant] -= 1;
            if in_degree[descendant] == 0 {
                ready.push(Reverse(descendant));
            }
        }
    }

    Ok(sorted_indexes)
}
