//! Regression GOAP planner.
//!
//! Given the goals an agent currently wants and the actions it can perform, the planner ranks
//! the goals, then searches backwards from each goal's desired beliefs towards a state that
//! already holds in the world. The first goal with a viable plan wins.
//!
//! Every mutable container used during a search is borrowed from the planner's pools and
//! returned before `plan` returns; at steady state a planning call does not allocate.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod node;
pub mod orderer;
pub mod plan;
pub mod planner;
pub mod pool;
pub mod queue;

pub use agent::{AgentStats, EffectReport, GoapAgent};
pub use config::{AgentConfig, PlannerConfig, PoolConfig};
pub use node::{ClosedSet, NodeId, SearchGraph, SearchNode};
pub use orderer::{GoalOrderer, PriorityRadixSorter};
pub use plan::{ActionPlan, ActionSequence};
pub use planner::GoapPlanner;
pub use pool::{GoapPools, Pool, PoolReport, PoolStats, Recycle};
pub use queue::PriorityQueue;
