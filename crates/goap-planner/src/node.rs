//! Search-node representation.
//!
//! Nodes live in a per-attempt arena ([`SearchGraph`]) and refer to each other by [`NodeId`]
//! index, so parent links never own anything and the whole graph is returned to the pools in
//! one pass when the attempt ends.

use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;

use goap_core::{ActionId, BeliefSet};

use crate::pool::Recycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One step of the regression search.
///
/// `required` is the set of beliefs still unmet at this point; `action` is the action whose
/// effects regressed the parent into this node (`None` for the goal's root). `children` stays
/// empty until the winning path is known, then holds the single successor on that path.
#[derive(Debug, Default)]
pub struct SearchNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) action: Option<ActionId>,
    pub(crate) required: BeliefSet,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cost: f32,
}

impl SearchNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn action(&self) -> Option<ActionId> {
        self.action
    }

    pub fn required(&self) -> &BeliefSet {
        &self.required
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Accumulated action cost from the goal root.
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// No continuation was chosen and no action produced this node.
    pub fn is_dead(&self) -> bool {
        self.children.is_empty() && self.action.is_none()
    }

    /// Estimated remaining cost: the number of unmet beliefs.
    ///
    /// Cheap but not a lower bound when action costs exceed 1, so searches are A*-shaped
    /// without being guaranteed optimal.
    pub fn heuristic(&self) -> f32 {
        self.required.len() as f32
    }

    pub fn f_score(&self) -> f32 {
        self.cost + self.heuristic()
    }
}

impl Recycle for SearchNode {
    fn recycle(&mut self) {
        self.parent = None;
        self.action = None;
        self.required.clear();
        self.children.clear();
        self.cost = 0.0;
    }
}

/// Arena of the nodes created during one goal attempt.
#[derive(Debug, Default)]
pub struct SearchGraph {
    pub(crate) nodes: Vec<SearchNode>,
}

impl SearchGraph {
    pub const ROOT: NodeId = NodeId(0);

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn push(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Prune the tree to the single chain ending at `leaf`: every ancestor keeps exactly one
    /// child, the next node towards `leaf`.
    pub(crate) fn reconstruct(&mut self, leaf: NodeId) {
        let mut current = leaf;
        while let Some(parent) = self.node(current).parent {
            let children = &mut self.node_mut(parent).children;
            children.clear();
            children.push(current);
            current = parent;
        }
    }

    /// Lowest-cost child of `id`; the first one wins ties. `None` if it has no children.
    pub fn cheapest_child(&self, id: NodeId) -> Option<NodeId> {
        let (&first, rest) = self.node(id).children.split_first()?;
        let mut best = first;
        let mut best_cost = self.node(first).cost;
        for &child in rest {
            let cost = self.node(child).cost;
            if cost < best_cost {
                best = child;
                best_cost = cost;
            }
        }
        Some(best)
    }
}

impl Recycle for SearchGraph {
    fn recycle(&mut self) {
        debug_assert!(
            self.nodes.is_empty(),
            "search graph recycled with live nodes; drain them into the node pool first"
        );
        self.nodes.clear();
    }
}

/// Regression states that were already expanded during one attempt.
///
/// Keyed by the node's pruned required-beliefs set: reaching the same set again by another
/// route cannot lead anywhere new. Entries are indexed by a fingerprint and confirmed by full
/// set equality; on a fingerprint collision the newer state is simply not recorded.
#[derive(Debug, Default)]
pub struct ClosedSet {
    by_fingerprint: HashMap<u64, NodeId>,
}

impl ClosedSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_fingerprint: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.by_fingerprint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fingerprint.is_empty()
    }

    pub fn contains(&self, graph: &SearchGraph, required: &BeliefSet) -> bool {
        self.by_fingerprint
            .get(&fingerprint(required))
            .is_some_and(|id| graph.node(*id).required == *required)
    }

    /// Record `id`'s current required set. Returns false if it was already closed.
    pub fn insert(&mut self, graph: &SearchGraph, id: NodeId) -> bool {
        let required = &graph.node(id).required;
        match self.by_fingerprint.entry(fingerprint(required)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }
}

impl Recycle for ClosedSet {
    fn recycle(&mut self) {
        self.by_fingerprint.clear();
    }
}

fn fingerprint(set: &BeliefSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    set.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use goap_core::BeliefId;

    fn node(parent: Option<NodeId>, cost: f32, required: &[u32]) -> SearchNode {
        SearchNode {
            parent,
            action: parent.map(|_| ActionId(0)),
            required: required.iter().map(|id| BeliefId(*id)).collect(),
            children: Vec::new(),
            cost,
        }
    }

    #[test]
    fn reconstruct_keeps_one_child_per_ancestor() {
        let mut graph = SearchGraph::default();
        let root = graph.push(node(None, 0.0, &[1]));
        let a = graph.push(node(Some(root), 1.0, &[2]));
        let _b = graph.push(node(Some(root), 2.0, &[3]));
        let leaf = graph.push(node(Some(a), 2.0, &[]));

        graph.reconstruct(leaf);

        assert_eq!(graph.node(root).children(), &[a]);
        assert_eq!(graph.node(a).children(), &[leaf]);
        assert_eq!(graph.cheapest_child(root), Some(a));
        assert_eq!(graph.cheapest_child(leaf), None);
        assert!(!graph.node(root).is_dead());
    }

    #[test]
    fn root_without_children_is_dead() {
        let mut graph = SearchGraph::default();
        let root = graph.push(node(None, 0.0, &[]));
        graph.reconstruct(root);
        assert!(graph.node(root).is_dead());
    }

    #[test]
    fn closed_set_matches_by_required_beliefs() {
        let mut graph = SearchGraph::default();
        let root = graph.push(node(None, 0.0, &[4, 7]));
        let mut closed = ClosedSet::default();

        assert!(closed.insert(&graph, root));
        assert!(!closed.insert(&graph, root));

        let same: BeliefSet = [BeliefId(7), BeliefId(4)].into_iter().collect();
        let other: BeliefSet = [BeliefId(4)].into_iter().collect();
        assert!(closed.contains(&graph, &same));
        assert!(!closed.contains(&graph, &other));

        closed.recycle();
        assert!(closed.is_empty());
        graph.nodes.clear();
    }
}
