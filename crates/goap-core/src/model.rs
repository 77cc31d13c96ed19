use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::{
    ActionId, AgentAction, Belief, BeliefId, BeliefKind, BeliefSet, GoapError, Goal, GoalId,
    Position, Result, SpatialWorld,
};

/// Every belief, goal and action known to one agent.
///
/// Beliefs are registered first (they are the vocabulary), then goals and actions that reference
/// them by [`BeliefId`]. Lookups by name go through ordered maps so iteration is deterministic.
pub struct GoapModel<W> {
    beliefs: Vec<Belief<W>>,
    belief_ids: BTreeMap<String, BeliefId>,
    goals: Vec<Goal>,
    goal_ids: BTreeMap<String, GoalId>,
    actions: Vec<AgentAction<W>>,
    action_ids: BTreeMap<String, ActionId>,
}

impl<W> Default for GoapModel<W> {
    fn default() -> Self {
        Self {
            beliefs: Vec::new(),
            belief_ids: BTreeMap::new(),
            goals: Vec::new(),
            goal_ids: BTreeMap::new(),
            actions: Vec::new(),
            action_ids: BTreeMap::new(),
        }
    }
}

impl<W> GoapModel<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_belief(&mut self, belief: Belief<W>) -> Result<BeliefId> {
        if self.belief_ids.contains_key(belief.name()) {
            return Err(GoapError::DuplicateBelief(belief.name().to_string()));
        }
        let id = BeliefId(self.beliefs.len() as u32);
        self.belief_ids.insert(belief.name().to_string(), id);
        self.beliefs.push(belief);
        Ok(id)
    }

    pub fn add_belief(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        condition: impl Fn(&W) -> bool + 'static,
    ) -> Result<BeliefId> {
        self.insert_belief(Belief::new(name, condition))
    }

    /// Belief backed by a perception collaborator (e.g. "has targets").
    pub fn add_sensor_belief(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        has_targets: impl Fn(&W) -> bool + 'static,
    ) -> Result<BeliefId> {
        self.insert_belief(Belief::new(name, has_targets).with_kind(BeliefKind::Sensor))
    }

    /// True while the agent is strictly closer than `radius` to `location`.
    pub fn add_location_belief(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        radius: f32,
        location: Position,
    ) -> Result<BeliefId>
    where
        W: SpatialWorld + 'static,
    {
        let belief = Belief::new(name, move |world: &W| {
            world.agent_position().distance(location) < radius
        })
        .with_kind(BeliefKind::Location)
        .with_location(move |_: &W| location);
        self.insert_belief(belief)
    }

    pub fn belief(&self, id: BeliefId) -> Option<&Belief<W>> {
        self.beliefs.get(id.index())
    }

    pub fn belief_id(&self, name: &str) -> Option<BeliefId> {
        self.belief_ids.get(name).copied()
    }

    /// Look a belief up by name, failing with [`GoapError::UnknownBelief`].
    pub fn require_belief(&self, name: &str) -> Result<BeliefId> {
        self.belief_id(name)
            .ok_or_else(|| GoapError::UnknownBelief(name.to_string()))
    }

    pub fn belief_count(&self) -> usize {
        self.beliefs.len()
    }

    pub fn beliefs(&self) -> impl Iterator<Item = (BeliefId, &Belief<W>)> {
        self.beliefs
            .iter()
            .enumerate()
            .map(|(i, b)| (BeliefId(i as u32), b))
    }

    /// Live evaluation of one belief. Ids from another model evaluate false.
    pub fn evaluate(&self, id: BeliefId, world: &W) -> bool {
        self.belief(id).is_some_and(|belief| belief.evaluate(world))
    }

    /// True if every belief in `set` currently holds. Stops at the first unmet belief.
    pub fn all_hold(&self, set: &BeliefSet, world: &W) -> bool {
        set.iter().all(|id| self.evaluate(id, world))
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<GoalId> {
        if self.goal_ids.contains_key(goal.name()) {
            return Err(GoapError::DuplicateGoal(goal.name().to_string()));
        }
        validate_priority(goal.name(), goal.priority())?;
        self.validate_beliefs(goal.name(), goal.desired_effects())?;

        let id = GoalId(self.goals.len() as u32);
        self.goal_ids.insert(goal.name().to_string(), id);
        self.goals.push(goal);
        Ok(id)
    }

    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.get(id.index())
    }

    pub fn goal_id(&self, name: &str) -> Option<GoalId> {
        self.goal_ids.get(name).copied()
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    pub fn goal_ids(&self) -> impl Iterator<Item = GoalId> + '_ {
        (0..self.goals.len()).map(|i| GoalId(i as u32))
    }

    pub fn set_goal_priority(&mut self, id: GoalId, priority: f32) -> Result<()> {
        let goal = self
            .goals
            .get_mut(id.index())
            .ok_or(GoapError::UnknownGoal(id.0))?;
        validate_priority(goal.name(), priority)?;
        goal.set_priority(priority);
        Ok(())
    }

    pub fn is_goal_satisfied(&self, id: GoalId, world: &W) -> bool {
        self.goal(id)
            .is_some_and(|goal| self.all_hold(goal.desired_effects(), world))
    }

    pub fn add_action(&mut self, action: AgentAction<W>) -> Result<ActionId> {
        if self.action_ids.contains_key(action.name()) {
            return Err(GoapError::DuplicateAction(action.name().to_string()));
        }
        let cost = action.cost();
        if !cost.is_finite() || cost < 0.0 {
            return Err(GoapError::InvalidCost {
                action: action.name().to_string(),
                cost,
            });
        }
        self.validate_beliefs(action.name(), action.preconditions())?;
        self.validate_beliefs(action.name(), action.effects())?;

        let id = ActionId(self.actions.len() as u32);
        self.action_ids.insert(action.name().to_string(), id);
        self.actions.push(action);
        Ok(id)
    }

    pub fn action(&self, id: ActionId) -> Option<&AgentAction<W>> {
        self.actions.get(id.index())
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut AgentAction<W>> {
        self.actions.get_mut(id.index())
    }

    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.action_ids.get(name).copied()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &AgentAction<W>)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| (ActionId(i as u32), a))
    }

    fn validate_beliefs(&self, owner: &str, set: &BeliefSet) -> Result<()> {
        match set.iter().find(|id| id.index() >= self.beliefs.len()) {
            Some(id) => Err(GoapError::UnknownBeliefId {
                owner: owner.to_string(),
                id: id.0,
            }),
            None => Ok(()),
        }
    }
}

fn validate_priority(goal: &str, priority: f32) -> Result<()> {
    if priority.is_finite() {
        Ok(())
    } else {
        Err(GoapError::InvalidPriority {
            goal: goal.to_string(),
            priority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Facts {
        fed: bool,
        position: Position,
    }

    impl SpatialWorld for Facts {
        fn agent_position(&self) -> Position {
            self.position
        }
    }

    #[test]
    fn belief_names_are_unique_keys() {
        let mut model = GoapModel::<Facts>::new();
        let fed = model.add_belief("fed", |w: &Facts| w.fed).unwrap();
        assert_eq!(model.belief_id("fed"), Some(fed));
        assert_eq!(
            model.add_belief("fed", |_: &Facts| true),
            Err(GoapError::DuplicateBelief("fed".to_string()))
        );
        assert_eq!(
            model.require_belief("hungry"),
            Err(GoapError::UnknownBelief("hungry".to_string()))
        );
    }

    #[test]
    fn registration_validates_references_and_numbers() {
        let mut model = GoapModel::<Facts>::new();
        let fed = model.add_belief("fed", |w: &Facts| w.fed).unwrap();

        let stray = model.add_action(AgentAction::new("eat").with_effect(BeliefId(9)));
        assert!(matches!(stray, Err(GoapError::UnknownBeliefId { id: 9, .. })));

        let negative = model.add_action(AgentAction::new("eat").with_cost(-1.0).with_effect(fed));
        assert!(matches!(negative, Err(GoapError::InvalidCost { .. })));

        let goal = model
            .add_goal(Goal::new("stay_fed").with_desired_effect(fed))
            .unwrap();
        assert!(matches!(
            model.set_goal_priority(goal, f32::NAN),
            Err(GoapError::InvalidPriority { .. })
        ));
        model.set_goal_priority(goal, 3.5).unwrap();
        assert_eq!(model.goal(goal).map(Goal::priority), Some(3.5));
    }

    #[test]
    fn goal_satisfaction_is_a_live_read() {
        let mut model = GoapModel::<Facts>::new();
        let fed = model.add_belief("fed", |w: &Facts| w.fed).unwrap();
        let goal = model
            .add_goal(Goal::new("stay_fed").with_desired_effect(fed))
            .unwrap();

        let mut world = Facts::default();
        assert!(!model.is_goal_satisfied(goal, &world));
        world.fed = true;
        assert!(model.is_goal_satisfied(goal, &world));
    }

    #[test]
    fn location_belief_uses_agent_position() {
        let mut model = GoapModel::<Facts>::new();
        let target = Position::new(10.0, 0.0, 0.0);
        let near = model.add_location_belief("near_well", 2.0, target).unwrap();

        let mut world = Facts::default();
        assert!(!model.evaluate(near, &world));
        world.position = Position::new(9.0, 0.0, 0.0);
        assert!(model.evaluate(near, &world));

        let belief = model.belief(near).unwrap();
        assert_eq!(belief.kind(), BeliefKind::Location);
        assert_eq!(belief.location(&world), target);
    }
}
