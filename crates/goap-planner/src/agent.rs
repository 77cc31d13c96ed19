//! Plan-consuming agent loop.
//!
//! [`GoapAgent`] owns a model, a planner and the plan in flight, and is advanced by the host
//! with [`GoapAgent::tick`]. Each tick it may replan, then starts, updates and retires at most
//! one action.

use core::fmt;

use goap_core::{ActionId, ActionStatus, BeliefSet, GoalId, GoapModel, TickContext};
use goap_tools::{TraceEvent, Tracer};
use tracing::{debug, trace};

use crate::{ActionPlan, AgentConfig, GoapPlanner};

/// Polled fingerprint of the world state a plan depends on. A changed value invalidates the
/// plan in flight.
pub type Signature<W> = Box<dyn Fn(&W) -> u64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStats {
    pub ticks: u64,
    pub plan_calls: u64,
    pub plans_found: u64,
    pub actions_started: u64,
    pub actions_completed: u64,
    pub actions_aborted: u64,
    pub no_progress: u64,
    pub invalidations: u64,
}

/// Effects of a completed action, checked against the world right after completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectReport {
    pub action: ActionId,
    /// Effects that did not hold. Non-empty means the action made no progress on them.
    pub unmet: BeliefSet,
}

impl EffectReport {
    pub fn made_progress(&self) -> bool {
        self.unmet.is_empty()
    }
}

pub struct GoapAgent<W> {
    id: u64,
    model: GoapModel<W>,
    planner: GoapPlanner,
    config: AgentConfig,
    goals: Vec<GoalId>,
    candidates: Vec<GoalId>,
    plan: Option<ActionPlan>,
    current_goal: Option<GoalId>,
    last_goal: Option<GoalId>,
    current_action: Option<ActionId>,
    signature: Option<Signature<W>>,
    last_signature: Option<u64>,
    last_effects: Option<EffectReport>,
    tracer: Tracer,
    stats: AgentStats,
}

impl<W> GoapAgent<W> {
    /// Agent pursuing every goal registered in `model`.
    pub fn new(model: GoapModel<W>) -> Self {
        let goals = model.goal_ids().collect();
        Self {
            id: 0,
            model,
            planner: GoapPlanner::new(),
            config: AgentConfig::default(),
            goals,
            candidates: Vec::new(),
            plan: None,
            current_goal: None,
            last_goal: None,
            current_action: None,
            signature: None,
            last_signature: None,
            last_effects: None,
            tracer: Tracer::new(),
            stats: AgentStats::default(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_planner(mut self, planner: GoapPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Replan immediately whenever `signature` yields a different value than on the previous
    /// tick, dropping the action and plan in flight.
    pub fn with_signature(mut self, signature: impl Fn(&W) -> u64 + 'static) -> Self {
        self.signature = Some(Box::new(signature));
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn model(&self) -> &GoapModel<W> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut GoapModel<W> {
        &mut self.model
    }

    pub fn planner(&self) -> &GoapPlanner {
        &self.planner
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn active_goals(&self) -> &[GoalId] {
        &self.goals
    }

    pub fn set_active_goals(&mut self, goals: impl IntoIterator<Item = GoalId>) {
        self.goals.clear();
        self.goals.extend(goals);
    }

    pub fn plan(&self) -> Option<&ActionPlan> {
        self.plan.as_ref()
    }

    pub fn current_goal(&self) -> Option<GoalId> {
        self.current_goal
    }

    /// Goal of the most recently finished plan.
    pub fn last_goal(&self) -> Option<GoalId> {
        self.last_goal
    }

    pub fn current_action(&self) -> Option<ActionId> {
        self.current_action
    }

    pub fn last_effects(&self) -> Option<&EffectReport> {
        self.last_effects.as_ref()
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        self.stats.ticks += 1;

        let invalidated = self.poll_signature(ctx, world);
        if invalidated || self.config.should_think(ctx.tick) {
            self.calculate_plan(ctx, world);
        }

        if self.current_action.is_none() {
            self.advance_plan(ctx, world);
        }

        self.update_current_action(ctx, world);
    }

    /// Stop the running action and drop the plan and current goal.
    pub fn interrupt(&mut self, ctx: &TickContext, world: &mut W) {
        self.abort_action(ctx, world);
        self.drop_plan();
        self.current_goal = None;
    }

    fn poll_signature(&mut self, ctx: &TickContext, world: &mut W) -> bool {
        let Some(signature) = self.signature.as_ref() else {
            return false;
        };
        let value = signature(&*world);
        let previous = self.last_signature.replace(value);
        if previous.is_none() || previous == Some(value) {
            return false;
        }

        debug!(agent = self.id, signature = value, "goap plan invalidated");
        self.stats.invalidations += 1;
        self.tracer
            .emit(TraceEvent::new(ctx.tick, "goap.invalidated").with_a(value));
        self.interrupt(ctx, world);
        true
    }

    fn calculate_plan(&mut self, ctx: &TickContext, world: &W) {
        if self.goals.is_empty() {
            return;
        }

        self.candidates.clear();
        match self.current_goal.and_then(|id| self.model.goal(id)) {
            Some(current) => {
                let level = current.priority();
                let model = &self.model;
                self.candidates.extend(
                    self.goals
                        .iter()
                        .copied()
                        .filter(|id| model.goal(*id).is_some_and(|g| g.priority() > level)),
                );
                if self.candidates.is_empty() {
                    return;
                }
            }
            None => self.candidates.extend_from_slice(&self.goals),
        }

        self.stats.plan_calls += 1;
        self.tracer.emit(
            TraceEvent::new(ctx.tick, "goap.plan.call").with_a(self.candidates.len() as u64),
        );

        match self
            .planner
            .plan(&self.model, world, &self.candidates, self.last_goal)
        {
            Some(plan) => {
                self.stats.plans_found += 1;
                self.tracer.emit(
                    TraceEvent::new(ctx.tick, "goap.plan.result")
                        .with_a(u64::from(plan.goal().0))
                        .with_b(plan.len() as u64),
                );
                trace!(
                    agent = self.id,
                    goal = plan.goal().0,
                    steps = plan.len(),
                    "goap agent adopted plan"
                );
                self.drop_plan();
                self.plan = Some(plan);
            }
            None => {
                self.tracer.emit(TraceEvent::new(ctx.tick, "goap.plan.none"));
            }
        }
    }

    fn advance_plan(&mut self, ctx: &TickContext, world: &mut W) {
        let Some(plan) = self.plan.as_mut() else {
            return;
        };
        let goal = plan.goal();
        let Some(action_id) = plan.next_action() else {
            return;
        };
        self.current_goal = Some(goal);

        let ready = self
            .model
            .action(action_id)
            .is_some_and(|action| self.model.all_hold(action.preconditions(), &*world));
        if !ready {
            debug!(
                agent = self.id,
                action = action_id.0,
                "goap preconditions no longer hold"
            );
            self.stats.actions_aborted += 1;
            self.tracer.emit(
                TraceEvent::new(ctx.tick, "goap.action.abort")
                    .with_a(u64::from(action_id.0))
                    .with_b(u64::from(goal.0)),
            );
            self.drop_plan();
            self.current_goal = None;
            return;
        }

        if let Some(action) = self.model.action_mut(action_id) {
            action.start(ctx, world);
            self.current_action = Some(action_id);
            self.stats.actions_started += 1;
            self.tracer.emit(
                TraceEvent::new(ctx.tick, "goap.action.start")
                    .with_a(u64::from(action_id.0))
                    .with_b(u64::from(goal.0)),
            );
        }
    }

    fn update_current_action(&mut self, ctx: &TickContext, world: &mut W) {
        let Some(action_id) = self.current_action else {
            return;
        };
        let Some(plan) = self.plan.as_ref() else {
            return;
        };
        let (plan_goal, plan_exhausted) = (plan.goal(), plan.is_empty());
        let Some(action) = self.model.action_mut(action_id) else {
            self.current_action = None;
            return;
        };

        let status = action.update(ctx, world);
        if status == ActionStatus::Success {
            self.check_effects(ctx, action_id, world);
        }

        if status == ActionStatus::Failure {
            self.abort_action(ctx, world);
            if plan_exhausted {
                self.finish_goal();
            }
            return;
        }

        if self.current_goal.is_some_and(|goal| goal != plan_goal) {
            self.abort_action(ctx, world);
            return;
        }

        if status == ActionStatus::Success {
            if let Some(action) = self.model.action_mut(action_id) {
                action.stop(world);
            }
            self.current_action = None;
            self.stats.actions_completed += 1;
            self.tracer.emit(
                TraceEvent::new(ctx.tick, "goap.action.complete")
                    .with_a(u64::from(action_id.0))
                    .with_b(u64::from(plan_goal.0)),
            );
            if plan_exhausted {
                self.finish_goal();
            }
        }
    }

    /// Evaluate the completed action's effects once, recording the ones that did not hold.
    fn check_effects(&mut self, ctx: &TickContext, action_id: ActionId, world: &W) {
        let Some(action) = self.model.action(action_id) else {
            return;
        };
        let mut unmet = match self.last_effects.take() {
            Some(report) => report.unmet,
            None => BeliefSet::new(),
        };
        unmet.copy_from(action.effects());
        unmet.retain(|belief| !self.model.evaluate(belief, world));

        if !unmet.is_empty() {
            debug!(
                agent = self.id,
                action = action.name(),
                unmet = unmet.len(),
                "goap action made no progress"
            );
            self.stats.no_progress += 1;
            self.tracer.emit(
                TraceEvent::new(ctx.tick, "goap.no_progress")
                    .with_a(u64::from(action_id.0))
                    .with_b(unmet.len() as u64),
            );
        }
        self.last_effects = Some(EffectReport {
            action: action_id,
            unmet,
        });
    }

    fn abort_action(&mut self, ctx: &TickContext, world: &mut W) {
        let Some(action_id) = self.current_action.take() else {
            return;
        };
        if let Some(action) = self.model.action_mut(action_id) {
            action.stop(world);
        }
        self.stats.actions_aborted += 1;
        self.tracer.emit(
            TraceEvent::new(ctx.tick, "goap.action.abort")
                .with_a(u64::from(action_id.0))
                .with_b(self.current_goal.map_or(u64::MAX, |g| u64::from(g.0))),
        );
    }

    fn finish_goal(&mut self) {
        self.last_goal = self.current_goal.take();
        self.drop_plan();
    }

    fn drop_plan(&mut self) {
        if let Some(plan) = self.plan.take() {
            self.planner.release_plan(plan);
        }
    }
}

impl<W> fmt::Debug for GoapAgent<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoapAgent")
            .field("id", &self.id)
            .field("goals", &self.goals)
            .field("plan", &self.plan)
            .field("current_goal", &self.current_goal)
            .field("last_goal", &self.last_goal)
            .field("current_action", &self.current_action)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goap_core::{AgentAction, Goal, InstantStrategy};

    #[derive(Default)]
    struct Lamp {
        on: bool,
        generation: u64,
    }

    fn lamp_agent() -> (GoapAgent<Lamp>, GoalId) {
        let mut model = GoapModel::new();
        let lit = model.add_belief("lit", |w: &Lamp| w.on).unwrap();
        model
            .add_action(
                AgentAction::new("switch_on")
                    .with_effect(lit)
                    .with_strategy(
                        InstantStrategy::new().with_on_complete(|w: &mut Lamp| w.on = true),
                    ),
            )
            .unwrap();
        let goal = model
            .add_goal(Goal::new("light").with_desired_effect(lit))
            .unwrap();
        (GoapAgent::new(model).with_tracer(Tracer::new().with_log()), goal)
    }

    #[test]
    fn single_action_plan_runs_to_completion() {
        let (mut agent, goal) = lamp_agent();
        let mut world = Lamp::default();
        let ctx = TickContext::new(0, 0.1);

        agent.tick(&ctx, &mut world);

        assert!(world.on);
        assert_eq!(agent.last_goal(), Some(goal));
        assert_eq!(agent.current_goal(), None);
        assert!(agent.plan().is_none());
        assert!(agent.last_effects().is_some_and(EffectReport::made_progress));
        assert_eq!(agent.stats().actions_completed, 1);
        assert_eq!(agent.planner().pool_report().action_sequences.outstanding(), 0);

        let log = agent.tracer().log().unwrap();
        assert_eq!(log.count("goap.action.start"), 1);
        assert_eq!(log.count("goap.action.complete"), 1);
    }

    #[test]
    fn changed_signature_interrupts_and_replans() {
        let (agent, _) = lamp_agent();
        let mut agent = agent.with_signature(|w: &Lamp| w.generation);
        let mut world = Lamp::default();
        let ctx = TickContext::new(0, 0.1);

        agent.tick(&ctx, &mut world);
        world.generation += 1;
        agent.tick(&ctx.next(), &mut world);

        assert_eq!(agent.stats().invalidations, 1);
        assert_eq!(agent.tracer().log().unwrap().count("goap.invalidated"), 1);
    }
}
