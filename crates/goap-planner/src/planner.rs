use core::mem;

use goap_core::{ActionId, BeliefSet, Goal, GoalId, GoapModel};
use tracing::{debug, trace, warn};

use crate::node::{ClosedSet, NodeId, SearchGraph, SearchNode};
use crate::{
    ActionPlan, GoalOrderer, GoapPools, PlannerConfig, PoolConfig, PoolReport, PriorityQueue,
};

enum SearchOutcome {
    Solved(NodeId),
    Unreachable,
    BudgetExhausted,
}

/// Regression A* planner over a [`GoapModel`].
///
/// Owns its pools, so one planner serves one planning context at a time. Build one per thread
/// when agents plan in parallel.
#[derive(Debug, Default)]
pub struct GoapPlanner {
    config: PlannerConfig,
    pools: GoapPools,
    orderer: GoalOrderer,
    ordered: Vec<GoalId>,
}

impl GoapPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pool_config(mut self, config: PoolConfig) -> Self {
        self.pools = GoapPools::new(config);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn pools(&self) -> &GoapPools {
        &self.pools
    }

    pub fn pool_report(&self) -> PoolReport {
        self.pools.report()
    }

    /// Find a plan for the highest-ranked achievable goal among `goals`.
    ///
    /// Goals are tried in [`GoalOrderer`] order and the first one with a viable plan wins.
    /// `None` means no candidate goal is currently achievable; it is not an error.
    pub fn plan<W>(
        &mut self,
        model: &GoapModel<W>,
        world: &W,
        goals: &[GoalId],
        most_recent: Option<GoalId>,
    ) -> Option<ActionPlan> {
        let mut ordered = mem::take(&mut self.ordered);
        self.orderer
            .order(model, world, goals, most_recent, &self.config, &mut ordered);
        debug!(
            requested = goals.len(),
            candidates = ordered.len(),
            actions = model.action_count(),
            "goap plan"
        );

        let mut found = None;
        for &goal_id in &ordered {
            let Some(goal) = model.goal(goal_id) else {
                continue;
            };
            if let Some(plan) = self.plan_goal(model, world, goal_id, goal) {
                debug!(
                    goal = goal.name(),
                    steps = plan.len(),
                    cost = plan.total_cost(),
                    "goap plan found"
                );
                found = Some(plan);
                break;
            }
        }
        if found.is_none() {
            debug!(candidates = ordered.len(), "goap no plan");
        }

        self.ordered = ordered;
        found
    }

    /// Return a consumed or superseded plan's containers to the pools.
    pub fn release_plan(&mut self, plan: ActionPlan) {
        self.pools.release_actions(plan.actions);
    }

    fn plan_goal<W>(
        &mut self,
        model: &GoapModel<W>,
        world: &W,
        goal_id: GoalId,
        goal: &Goal,
    ) -> Option<ActionPlan> {
        let mut graph = self.pools.node_lists.acquire();
        let mut open = self.pools.queues.acquire();
        let mut closed = self.pools.closed_sets.acquire();

        let mut required = self.pools.belief_sets.acquire();
        required.copy_from(goal.desired_effects());
        let root = self.alloc_node(None, None, required, 0.0);
        let root_score = root.f_score();
        let root_id = graph.push(root);
        debug_assert_eq!(root_id, SearchGraph::ROOT);
        open.enqueue(root_id, root_score);

        let outcome = self.search(model, world, &mut graph, &mut open, &mut closed);

        let plan = match outcome {
            SearchOutcome::Solved(leaf) if graph.node(SearchGraph::ROOT).is_dead() => {
                trace!(goal = goal.name(), leaf = leaf.0, "goap goal needs no actions");
                None
            }
            SearchOutcome::Solved(leaf) => Some(self.materialize(&graph, goal_id, leaf)),
            SearchOutcome::Unreachable => {
                trace!(goal = goal.name(), nodes = graph.len(), "goap goal unreachable");
                None
            }
            SearchOutcome::BudgetExhausted => {
                warn!(
                    goal = goal.name(),
                    max_expansions = self.config.max_expansions,
                    "goap search budget exhausted"
                );
                None
            }
        };

        self.release_graph(graph);
        self.pools.queues.release(open);
        self.pools.closed_sets.release(closed);
        plan
    }

    fn search<W>(
        &mut self,
        model: &GoapModel<W>,
        world: &W,
        graph: &mut SearchGraph,
        open: &mut PriorityQueue<NodeId>,
        closed: &mut ClosedSet,
    ) -> SearchOutcome {
        let mut expansions = 0usize;

        while let Some(current) = open.dequeue() {
            graph
                .node_mut(current)
                .required
                .retain(|belief| !model.evaluate(belief, world));

            if closed.contains(graph, graph.node(current).required()) {
                continue;
            }
            expansions += 1;
            if expansions > self.config.max_expansions {
                return SearchOutcome::BudgetExhausted;
            }
            closed.insert(graph, current);

            if graph.node(current).required().is_empty() {
                graph.reconstruct(current);
                trace!(expansions, nodes = graph.len(), "goap search solved");
                return SearchOutcome::Solved(current);
            }

            self.expand(model, graph, open, closed, current);
        }

        SearchOutcome::Unreachable
    }

    fn expand<W>(
        &mut self,
        model: &GoapModel<W>,
        graph: &mut SearchGraph,
        open: &mut PriorityQueue<NodeId>,
        closed: &ClosedSet,
        current: NodeId,
    ) {
        let base_cost = graph.node(current).cost();

        for (action_id, action) in model.actions() {
            if !action.is_relevant(graph.node(current).required()) {
                continue;
            }

            let mut required = self.pools.belief_sets.acquire();
            required.copy_from(graph.node(current).required());
            required.difference_with(action.effects());
            required.union_with(action.preconditions());

            if closed.contains(graph, &required) {
                self.pools.belief_sets.release(required);
                continue;
            }

            let node = self.alloc_node(
                Some(current),
                Some(action_id),
                required,
                base_cost + action.cost(),
            );
            let score = node.f_score();
            let id = graph.push(node);
            graph.node_mut(current).children.push(id);
            open.enqueue(id, score);
        }
    }

    fn alloc_node(
        &mut self,
        parent: Option<NodeId>,
        action: Option<ActionId>,
        required: BeliefSet,
        cost: f32,
    ) -> SearchNode {
        let mut node = self.pools.nodes.acquire();
        node.parent = parent;
        node.action = action;
        node.required = required;
        node.children = self.pools.child_lists.acquire();
        node.cost = cost;
        node
    }

    /// Walk the pruned chain from the root, pushing each step's action so the leaf's action is
    /// popped first.
    fn materialize(&mut self, graph: &SearchGraph, goal: GoalId, leaf: NodeId) -> ActionPlan {
        let mut actions = self.pools.acquire_actions();
        let mut cursor = SearchGraph::ROOT;
        while let Some(child) = graph.cheapest_child(cursor) {
            if let Some(action) = graph.node(child).action() {
                actions.push(action);
            }
            cursor = child;
        }
        debug_assert_eq!(cursor, leaf, "pruned chain must end at the solution leaf");
        ActionPlan::new(goal, actions, graph.node(leaf).cost())
    }

    fn release_graph(&mut self, mut graph: SearchGraph) {
        for mut node in graph.nodes.drain(..) {
            self.pools.belief_sets.release(mem::take(&mut node.required));
            self.pools.child_lists.release(mem::take(&mut node.children));
            self.pools.nodes.release(node);
        }
        self.pools.node_lists.release(graph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goap_core::AgentAction;

    #[derive(Default)]
    struct Switches {
        on: Vec<bool>,
    }

    #[test]
    fn search_bookkeeping_is_returned_to_the_pools() {
        let mut model = GoapModel::<Switches>::new();
        let a = model.add_belief("a", |w: &Switches| w.on[0]).unwrap();
        let b = model.add_belief("b", |w: &Switches| w.on[1]).unwrap();
        model
            .add_action(AgentAction::new("make_a").with_effect(a))
            .unwrap();
        model
            .add_action(
                AgentAction::new("make_b")
                    .with_precondition(a)
                    .with_effect(b),
            )
            .unwrap();
        let goal = model
            .add_goal(Goal::new("both").with_desired_effect(b))
            .unwrap();

        let world = Switches {
            on: vec![false, false],
        };
        let mut planner = GoapPlanner::new().with_pool_config(PoolConfig::lazy());
        let plan = planner.plan(&model, &world, &[goal], None).unwrap();

        let report = planner.pool_report();
        assert_eq!(report.search_outstanding(), 0);
        assert_eq!(report.action_sequences.outstanding(), 1);
        assert!(report.nodes.acquired >= 3);

        planner.release_plan(plan);
        assert_eq!(planner.pool_report().action_sequences.outstanding(), 0);
    }

    #[test]
    fn steady_state_planning_does_not_construct() {
        let mut model = GoapModel::<Switches>::new();
        let a = model.add_belief("a", |w: &Switches| w.on[0]).unwrap();
        model
            .add_action(AgentAction::new("make_a").with_effect(a))
            .unwrap();
        let goal = model
            .add_goal(Goal::new("a").with_desired_effect(a))
            .unwrap();
        let world = Switches { on: vec![false] };

        let mut planner = GoapPlanner::new().with_pool_config(PoolConfig::lazy());
        let first = planner.plan(&model, &world, &[goal], None).unwrap();
        planner.release_plan(first);
        let created = planner.pool_report().created();

        for _ in 0..10 {
            let plan = planner.plan(&model, &world, &[goal], None).unwrap();
            planner.release_plan(plan);
        }
        assert_eq!(planner.pool_report().created(), created);
    }
}
