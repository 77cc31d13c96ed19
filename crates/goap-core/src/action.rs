use core::fmt;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ActionStrategy, BeliefId, BeliefSet, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionId(pub u32);

impl ActionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionStatus {
    Running,
    Success,
    Failure,
}

/// A cost, a set of required beliefs, a set of resulting beliefs and an execution strategy.
///
/// Actions are built once and reused by many plans; all per-plan bookkeeping lives in the
/// planner's search nodes and in the plan, never here. The only mutable state is the bound
/// strategy's per-run state, which `start` resets.
pub struct AgentAction<W> {
    name: Cow<'static, str>,
    cost: f32,
    preconditions: BeliefSet,
    effects: BeliefSet,
    strategy: ActionStrategy<W>,
}

impl<W> AgentAction<W> {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            cost: 1.0,
            preconditions: BeliefSet::new(),
            effects: BeliefSet::new(),
            strategy: ActionStrategy::default(),
        }
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_precondition(mut self, belief: BeliefId) -> Self {
        self.preconditions.insert(belief);
        self
    }

    pub fn with_effect(mut self, belief: BeliefId) -> Self {
        self.effects.insert(belief);
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<ActionStrategy<W>>) -> Self {
        self.strategy = strategy.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn preconditions(&self) -> &BeliefSet {
        &self.preconditions
    }

    pub fn effects(&self) -> &BeliefSet {
        &self.effects
    }

    /// True if performing this action could satisfy at least one of `required`.
    pub fn is_relevant(&self, required: &BeliefSet) -> bool {
        self.effects.intersects(required)
    }

    pub fn strategy(&self) -> &ActionStrategy<W> {
        &self.strategy
    }

    pub fn start(&mut self, ctx: &TickContext, world: &mut W) {
        self.strategy.start(ctx, world);
    }

    /// Advance the strategy by one tick.
    ///
    /// The strategy is only updated while it can perform; `Failure` means it could not.
    pub fn update(&mut self, ctx: &TickContext, world: &mut W) -> ActionStatus {
        if !self.strategy.can_perform(&*world) {
            return ActionStatus::Failure;
        }
        self.strategy.update(ctx, world);
        if self.strategy.is_complete() {
            ActionStatus::Success
        } else {
            ActionStatus::Running
        }
    }

    pub fn stop(&mut self, world: &mut W) {
        self.strategy.stop(world);
    }

    pub fn is_complete(&self) -> bool {
        self.strategy.is_complete()
    }

    pub fn can_perform(&self, world: &W) -> bool {
        self.strategy.can_perform(world)
    }
}

impl<W> fmt::Debug for AgentAction<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentAction")
            .field("name", &self.name)
            .field("cost", &self.cost)
            .field("preconditions", &self.preconditions)
            .field("effects", &self.effects)
            .field("strategy", &self.strategy)
            .finish()
    }
}
