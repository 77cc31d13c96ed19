//! Reusable containers for the search.
//!
//! A pool hands out owned values and takes them back by value. Because release consumes the
//! value, releasing the same instance twice, or touching it after release, does not compile.

use core::fmt;

use goap_core::BeliefSet;

use crate::node::{ClosedSet, NodeId, SearchGraph, SearchNode};
use crate::plan::ActionSequence;
use crate::{PoolConfig, PriorityQueue};

/// Reset a value to its empty state while keeping its allocations.
pub trait Recycle {
    fn recycle(&mut self);
}

impl Recycle for BeliefSet {
    fn recycle(&mut self) {
        self.clear();
    }
}

impl<T> Recycle for Vec<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances constructed, including pre-warmed ones.
    pub created: u64,
    pub acquired: u64,
    pub released: u64,
}

impl PoolStats {
    /// Instances currently checked out.
    pub fn outstanding(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

pub struct Pool<T> {
    free: Vec<T>,
    make: Box<dyn Fn() -> T + Send + Sync>,
    stats: PoolStats,
}

impl<T: Recycle> Pool<T> {
    pub fn new(make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            free: Vec::new(),
            make: Box::new(make),
            stats: PoolStats::default(),
        }
    }

    /// Construct `count` instances up front.
    pub fn prewarmed(make: impl Fn() -> T + Send + Sync + 'static, count: usize) -> Self {
        let mut pool = Self::new(make);
        pool.free.reserve(count);
        for _ in 0..count {
            let item = (pool.make)();
            pool.free.push(item);
        }
        pool.stats.created = count as u64;
        pool
    }

    /// Take an empty instance, constructing one if the pool is exhausted.
    pub fn acquire(&mut self) -> T {
        self.stats.acquired += 1;
        match self.free.pop() {
            Some(item) => item,
            None => {
                self.stats.created += 1;
                (self.make)()
            }
        }
    }

    /// Clear `item` and keep it for the next `acquire`.
    pub fn release(&mut self, mut item: T) {
        item.recycle();
        self.stats.released += 1;
        self.free.push(item);
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("available", &self.free.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Snapshot of every pool's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub belief_sets: PoolStats,
    pub nodes: PoolStats,
    pub child_lists: PoolStats,
    pub closed_sets: PoolStats,
    pub node_lists: PoolStats,
    pub queues: PoolStats,
    pub action_sequences: PoolStats,
}

impl PoolReport {
    /// Containers still checked out by search bookkeeping. Zero between `plan` calls.
    pub fn search_outstanding(&self) -> u64 {
        self.belief_sets.outstanding()
            + self.nodes.outstanding()
            + self.child_lists.outstanding()
            + self.closed_sets.outstanding()
            + self.node_lists.outstanding()
            + self.queues.outstanding()
    }

    /// Total instances ever constructed across all pools.
    pub fn created(&self) -> u64 {
        self.belief_sets.created
            + self.nodes.created
            + self.child_lists.created
            + self.closed_sets.created
            + self.node_lists.created
            + self.queues.created
            + self.action_sequences.created
    }
}

/// The planner's pools, one per container kind.
///
/// Owned by a [`GoapPlanner`](crate::GoapPlanner); build one per planning context (one per
/// thread when agents plan in parallel).
#[derive(Debug)]
pub struct GoapPools {
    pub(crate) belief_sets: Pool<BeliefSet>,
    pub(crate) nodes: Pool<SearchNode>,
    pub(crate) child_lists: Pool<Vec<NodeId>>,
    pub(crate) closed_sets: Pool<ClosedSet>,
    pub(crate) node_lists: Pool<SearchGraph>,
    pub(crate) queues: Pool<PriorityQueue<NodeId>>,
    pub(crate) action_sequences: Pool<ActionSequence>,
}

impl GoapPools {
    pub fn new(config: PoolConfig) -> Self {
        let beliefs = config.beliefs_per_set;
        let graph_nodes = config.nodes_per_list;
        Self {
            belief_sets: Pool::prewarmed(
                move || BeliefSet::with_capacity(beliefs),
                config.belief_sets,
            ),
            nodes: Pool::prewarmed(SearchNode::default, config.nodes),
            child_lists: Pool::prewarmed(|| Vec::with_capacity(4), config.child_lists),
            closed_sets: Pool::prewarmed(
                move || ClosedSet::with_capacity(graph_nodes),
                config.closed_sets,
            ),
            node_lists: Pool::prewarmed(
                move || SearchGraph::with_capacity(graph_nodes),
                config.node_lists,
            ),
            queues: Pool::prewarmed(
                move || PriorityQueue::with_capacity(graph_nodes),
                config.queues,
            ),
            action_sequences: Pool::prewarmed(
                || ActionSequence::with_capacity(8),
                config.action_sequences,
            ),
        }
    }

    pub fn report(&self) -> PoolReport {
        PoolReport {
            belief_sets: self.belief_sets.stats(),
            nodes: self.nodes.stats(),
            child_lists: self.child_lists.stats(),
            closed_sets: self.closed_sets.stats(),
            node_lists: self.node_lists.stats(),
            queues: self.queues.stats(),
            action_sequences: self.action_sequences.stats(),
        }
    }

    /// Return a consumed plan's action sequence.
    pub(crate) fn release_actions(&mut self, actions: ActionSequence) {
        self.action_sequences.release(actions);
    }

    pub(crate) fn acquire_actions(&mut self) -> ActionSequence {
        self.action_sequences.acquire()
    }
}

impl Default for GoapPools {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_prefers_released_instances() {
        let mut pool = Pool::new(|| Vec::<u32>::with_capacity(16));
        let mut first = pool.acquire();
        first.extend([1, 2, 3]);
        pool.release(first);

        let again = pool.acquire();
        assert!(again.is_empty());
        assert!(again.capacity() >= 16);
        assert_eq!(
            pool.stats(),
            PoolStats {
                created: 1,
                acquired: 2,
                released: 1
            }
        );
        assert_eq!(pool.stats().outstanding(), 1);
    }

    #[test]
    fn prewarmed_pool_does_not_construct_until_exhausted() {
        let mut pool = Pool::prewarmed(Vec::<u8>::new, 2);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.stats().created, 2);
        let c = pool.acquire();
        assert_eq!(pool.stats().created, 3);
        pool.release(a);
        pool.release(b);
        pool.release(c);
        assert_eq!(pool.available(), 3);
        assert_eq!(pool.stats().outstanding(), 0);
    }
}
