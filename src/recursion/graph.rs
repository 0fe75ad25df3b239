//! Call graph over dispatch ids and Tarjan's SCC decomposition.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::scope::DispatchId;

/// Directed graph whose nodes are the definitions of one grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    edges: BTreeMap<DispatchId, BTreeSet<DispatchId>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: DispatchId) {
        self.edges.entry(node).or_default();
    }

    /// Add `from → to`. Both ends are added as nodes.
    pub fn add_edge(&mut self, from: DispatchId, to: DispatchId) {
        self.add_node(to);
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn contains(&self, node: DispatchId) -> bool {
        self.edges.contains_key(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = DispatchId> + '_ {
        self.edges.keys().copied()
    }

    pub fn successors(&self, node: DispatchId) -> impl Iterator<Item = DispatchId> + '_ {
        self.edges.get(&node).into_iter().flatten().copied()
    }

    pub fn has_self_loop(&self, node: DispatchId) -> bool {
        self.edges
            .get(&node)
            .is_some_and(|targets| targets.contains(&node))
    }

    /// Strongly connected components, each sorted by dispatch id.
    ///
    /// Components come out in Tarjan's emission order: a component is emitted
    /// only after every component it has an edge into, so callees precede
    /// their callers.
    pub fn strongly_connected_components(&self) -> Vec<Vec<DispatchId>> {
        let mut tarjan = Tarjan::new(self);
        for node in self.nodes() {
            if !tarjan.index.contains_key(&node) {
                tarjan.connect(node);
            }
        }
        tarjan.components
    }
}

struct Tarjan<'a> {
    graph: &'a CallGraph,
    next_index: usize,
    index: HashMap<DispatchId, usize>,
    lowlink: HashMap<DispatchId, usize>,
    stack: Vec<DispatchId>,
    on_stack: HashSet<DispatchId>,
    components: Vec<Vec<DispatchId>>,
}

impl<'a> Tarjan<'a> {
    fn new(graph: &'a CallGraph) -> Self {
        Tarjan {
            graph,
            next_index: 0,
            index: HashMap::new(),
            lowlink: HashMap::new(),
            stack: Vec::new(),
            on_stack: HashSet::new(),
            components: Vec::new(),
        }
    }

    fn connect(&mut self, node: DispatchId) {
        let index = self.next_index;
        self.next_index += 1;
        self.index.insert(node, index);
        self.lowlink.insert(node, index);
        self.stack.push(node);
        self.on_stack.insert(node);

        let graph = self.graph;
        let mut low = index;
        for target in graph.successors(node) {
            match self.index.get(&target) {
                None => {
                    self.connect(target);
                    low = low.min(self.lowlink[&target]);
                }
                Some(&target_index) if self.on_stack.contains(&target) => {
                    low = low.min(target_index);
                }
                Some(_) => {}
            }
        }
        self.lowlink.insert(node, low);

        if low == index {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                component.push(member);
                if member == node {
                    break;
                }
            }
            component.sort();
            self.components.push(component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> DispatchId {
        DispatchId::new(n)
    }

    fn graph(nodes: &[u32], edges: &[(u32, u32)]) -> CallGraph {
        let mut graph = CallGraph::new();
        for &n in nodes {
            graph.add_node(id(n));
        }
        for &(from, to) in edges {
            graph.add_edge(id(from), id(to));
        }
        graph
    }

    fn components(graph: &CallGraph) -> Vec<Vec<u32>> {
        graph
            .strongly_connected_components()
            .into_iter()
            .map(|c| c.into_iter().map(DispatchId::get).collect())
            .collect()
    }

    #[test]
    fn test_isolated_nodes_are_singletons() {
        let g = graph(&[0, 1, 2], &[]);
        assert_eq!(components(&g), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_self_loop_is_singleton_component() {
        let g = graph(&[0], &[(0, 0)]);
        assert_eq!(components(&g), vec![vec![0]]);
        assert!(g.has_self_loop(id(0)));
    }

    #[test]
    fn test_two_cycle() {
        let g = graph(&[0, 1], &[(0, 1), (1, 0)]);
        assert_eq!(components(&g), vec![vec![0, 1]]);
        assert!(!g.has_self_loop(id(0)));
    }

    #[test]
    fn test_callees_emitted_before_callers() {
        // 0 → 1 → 2, and 2 is called by 3 as well
        let g = graph(&[0, 1, 2, 3], &[(0, 1), (1, 2), (3, 2)]);
        let order = components(&g);
        let position = |n: u32| order.iter().position(|c| c.contains(&n)).unwrap();
        assert!(position(2) < position(1));
        assert!(position(1) < position(0));
        assert!(position(2) < position(3));
    }

    #[test]
    fn test_cycle_with_tail() {
        // 0 → 1 ⇄ 2 → 3
        let g = graph(&[0, 1, 2, 3], &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        assert_eq!(components(&g), vec![vec![3], vec![1, 2], vec![0]]);
    }

    #[test]
    fn test_three_cycle_with_inner_self_loop() {
        let g = graph(&[0, 1, 2], &[(0, 1), (1, 2), (2, 0), (1, 1)]);
        assert_eq!(components(&g), vec![vec![0, 1, 2]]);
        assert!(g.has_self_loop(id(1)));
        assert!(!g.has_self_loop(id(2)));
    }
}
