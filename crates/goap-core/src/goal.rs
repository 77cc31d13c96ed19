use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BeliefId, BeliefSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalId(pub u32);

impl GoalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A desired set of beliefs plus a priority.
///
/// A goal is satisfied when every desired belief currently evaluates true; satisfied goals are
/// never planned for. The desired set is fixed once the goal is registered, the priority is not.
#[derive(Debug, Clone)]
pub struct Goal {
    name: Cow<'static, str>,
    priority: f32,
    desired_effects: BeliefSet,
}

impl Goal {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            priority: 1.0,
            desired_effects: BeliefSet::new(),
        }
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_desired_effect(mut self, belief: BeliefId) -> Self {
        self.desired_effects.insert(belief);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: f32) {
        self.priority = priority;
    }

    pub fn desired_effects(&self) -> &BeliefSet {
        &self.desired_effects
    }
}
