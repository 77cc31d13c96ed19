//! Belief, goal and action model for goal-oriented action planning.
//!
//! Beliefs are named boolean predicates over a host-owned world `W`. Goals and actions are
//! declarative records expressed in terms of belief sets; the planner crate regresses over them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod belief;
pub mod error;
pub mod goal;
pub mod model;
pub mod strategy;
pub mod tick;
pub mod world;

pub use action::{ActionId, ActionStatus, AgentAction};
pub use belief::{Belief, BeliefId, BeliefKind, BeliefSet, Predicate};
pub use error::{GoapError, Result};
pub use goal::{Goal, GoalId};
pub use model::GoapModel;
pub use strategy::{
    ActionStrategy, InstantStrategy, Strategy, TimedStrategy, UntilStrategy, WorldHook,
};
pub use tick::TickContext;
pub use world::{Position, SpatialWorld};
