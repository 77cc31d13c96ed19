use goap_core::{ActionId, GoalId};

use crate::pool::Recycle;

/// Last-in first-out stack of actions: the top is the next action to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSequence {
    stack: Vec<ActionId>,
}

impl ActionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, action: ActionId) {
        self.stack.push(action);
    }

    pub fn pop(&mut self) -> Option<ActionId> {
        self.stack.pop()
    }

    pub fn peek(&self) -> Option<ActionId> {
        self.stack.last().copied()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Remaining actions, next one first.
    pub fn iter_in_execution_order(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.stack.iter().rev().copied()
    }
}

impl Recycle for ActionSequence {
    fn recycle(&mut self) {
        self.stack.clear();
    }
}

/// The result of a successful planning call: the goal it serves and the actions to run.
///
/// The action sequence is a pooled container. Hand the plan back with
/// [`GoapPlanner::release_plan`](crate::GoapPlanner::release_plan) once it is consumed or
/// superseded; dropping it instead is safe but forfeits the reuse.
#[derive(Debug, PartialEq)]
pub struct ActionPlan {
    goal: GoalId,
    pub(crate) actions: ActionSequence,
    total_cost: f32,
}

impl ActionPlan {
    pub(crate) fn new(goal: GoalId, actions: ActionSequence, total_cost: f32) -> Self {
        Self {
            goal,
            actions,
            total_cost,
        }
    }

    pub fn goal(&self) -> GoalId {
        self.goal
    }

    /// Sum of the costs of every action the plan was built with.
    pub fn total_cost(&self) -> f32 {
        self.total_cost
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Pop the next action to run.
    pub fn next_action(&mut self) -> Option<ActionId> {
        self.actions.pop()
    }

    pub fn peek(&self) -> Option<ActionId> {
        self.actions.peek()
    }

    pub fn actions(&self) -> &ActionSequence {
        &self.actions
    }

    /// Remaining actions in the order they will run.
    pub fn steps(&self) -> Vec<ActionId> {
        self.actions.iter_in_execution_order().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_pops_most_recent_push_first() {
        let mut seq = ActionSequence::with_capacity(4);
        seq.push(ActionId(2));
        seq.push(ActionId(0));
        seq.push(ActionId(1));

        let order: Vec<_> = seq.iter_in_execution_order().collect();
        assert_eq!(order, vec![ActionId(1), ActionId(0), ActionId(2)]);
        assert_eq!(seq.pop(), Some(ActionId(1)));
        assert_eq!(seq.peek(), Some(ActionId(0)));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn plan_consumes_in_execution_order() {
        let mut seq = ActionSequence::new();
        seq.push(ActionId(5));
        seq.push(ActionId(3));
        let mut plan = ActionPlan::new(GoalId(0), seq, 2.5);

        assert_eq!(plan.steps(), vec![ActionId(3), ActionId(5)]);
        assert_eq!(plan.total_cost(), 2.5);
        assert_eq!(plan.next_action(), Some(ActionId(3)));
        assert_eq!(plan.next_action(), Some(ActionId(5)));
        assert_eq!(plan.next_action(), None);
        assert!(plan.is_empty());
    }
}
