#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PlannerConfig {
    /// Upper bound on dequeued nodes per goal attempt. An attempt that hits the budget is
    /// treated as unreachable and the planner moves on to the next goal.
    pub max_expansions: usize,

    /// Scaled like a priority and subtracted from the most-recently-pursued goal's key, by at
    /// least one step, so it loses ties against equally important rivals.
    pub recency_penalty: f32,

    /// Priorities are scaled by this factor and rounded to integers before ranking.
    pub priority_scale: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 4096,
            recency_penalty: 0.01,
            priority_scale: 100.0,
        }
    }
}

impl PlannerConfig {
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_recency_penalty(mut self, recency_penalty: f32) -> Self {
        self.recency_penalty = recency_penalty;
        self
    }

    pub fn with_priority_scale(mut self, priority_scale: f32) -> Self {
        self.priority_scale = priority_scale;
        self
    }
}

/// Pre-warm sizes for the planner's pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PoolConfig {
    pub nodes: usize,
    pub belief_sets: usize,
    /// Number of beliefs each pooled set is sized for.
    pub beliefs_per_set: usize,
    pub child_lists: usize,
    pub node_lists: usize,
    /// Node capacity of each pooled search graph.
    pub nodes_per_list: usize,
    pub closed_sets: usize,
    pub queues: usize,
    pub action_sequences: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            nodes: 128,
            belief_sets: 128,
            beliefs_per_set: 128,
            child_lists: 128,
            node_lists: 2,
            nodes_per_list: 128,
            closed_sets: 2,
            queues: 2,
            action_sequences: 16,
        }
    }
}

impl PoolConfig {
    /// No pre-warming; every pool grows on first use.
    pub fn lazy() -> Self {
        Self {
            nodes: 0,
            belief_sets: 0,
            child_lists: 0,
            node_lists: 0,
            closed_sets: 0,
            queues: 0,
            action_sequences: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AgentConfig {
    pub think_every_ticks: u32,
    pub think_offset_ticks: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            think_every_ticks: 1,
            think_offset_ticks: 0,
        }
    }
}

impl AgentConfig {
    /// Spread agents that think every `think_every_ticks` over different ticks, keyed by id.
    pub fn deterministic(agent_id: u64, think_every_ticks: u32) -> Self {
        let every = think_every_ticks.max(1);
        let offset = (agent_id % (every as u64)) as u32;
        Self {
            think_every_ticks: every,
            think_offset_ticks: offset,
        }
    }

    pub fn should_think(&self, tick: u64) -> bool {
        let every = self.think_every_ticks.max(1) as u64;
        ((tick + (self.think_offset_ticks as u64)) % every) == 0
    }
}
