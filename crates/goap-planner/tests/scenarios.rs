use goap_core::{AgentAction, BeliefId, Goal, GoalId, GoapModel};
use goap_planner::{GoapPlanner, PlannerConfig, PoolConfig};

/// World of independent boolean facts; belief `i` reads fact `i`.
struct Facts(Vec<bool>);

fn facts_model(count: usize) -> (GoapModel<Facts>, Vec<BeliefId>) {
    let mut model = GoapModel::new();
    let beliefs = (0..count)
        .map(|i| {
            model
                .add_belief(format!("b{i}"), move |w: &Facts| w.0[i])
                .unwrap()
        })
        .collect();
    (model, beliefs)
}

fn action(name: &str, cost: f32, pre: &[BeliefId], eff: &[BeliefId]) -> AgentAction<Facts> {
    let mut action = AgentAction::new(name.to_string()).with_cost(cost);
    for b in pre {
        action = action.with_precondition(*b);
    }
    for b in eff {
        action = action.with_effect(*b);
    }
    action
}

fn goal(model: &mut GoapModel<Facts>, name: &str, priority: f32, desired: &[BeliefId]) -> GoalId {
    let mut goal = Goal::new(name.to_string()).with_priority(priority);
    for b in desired {
        goal = goal.with_desired_effect(*b);
    }
    model.add_goal(goal).unwrap()
}

fn planner() -> GoapPlanner {
    GoapPlanner::new().with_pool_config(PoolConfig::lazy())
}

#[test]
fn single_action_goal() {
    let (mut model, b) = facts_model(1);
    let a1 = model.add_action(action("a1", 1.0, &[], &[b[0]])).unwrap();
    let g1 = goal(&mut model, "g1", 1.0, &[b[0]]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &Facts(vec![false]), &[g1], None)
        .expect("plan");

    assert_eq!(plan.goal(), g1);
    assert_eq!(plan.steps(), vec![a1]);
    assert_eq!(plan.total_cost(), 1.0);
    planner.release_plan(plan);
}

#[test]
fn unreachable_goal_yields_no_plan() {
    let (mut model, b) = facts_model(2);
    model.add_action(action("other", 1.0, &[], &[b[1]])).unwrap();
    let g1 = goal(&mut model, "g1", 1.0, &[b[0]]);

    let mut planner = planner();
    assert!(planner
        .plan(&model, &Facts(vec![false, false]), &[g1], None)
        .is_none());
    assert_eq!(planner.pool_report().search_outstanding(), 0);
    assert_eq!(planner.pool_report().action_sequences.outstanding(), 0);
}

#[test]
fn higher_priority_goal_wins_then_falls_through() {
    let (mut model, b) = facts_model(2);
    let a1 = model.add_action(action("a1", 1.0, &[], &[b[0]])).unwrap();
    let a2 = model.add_action(action("a2", 1.0, &[], &[b[1]])).unwrap();
    let g1 = goal(&mut model, "g1", 1.0, &[b[0]]);
    let g2 = goal(&mut model, "g2", 2.0, &[b[1]]);
    let world = Facts(vec![false, false]);

    let mut planner = planner();
    let plan = planner.plan(&model, &world, &[g1, g2], None).expect("plan");
    assert_eq!(plan.goal(), g2);
    assert_eq!(plan.steps(), vec![a2]);
    planner.release_plan(plan);

    let (mut without_a2, b) = facts_model(2);
    let a1_only = without_a2.add_action(action("a1", 1.0, &[], &[b[0]])).unwrap();
    let g1 = goal(&mut without_a2, "g1", 1.0, &[b[0]]);
    let g2 = goal(&mut without_a2, "g2", 2.0, &[b[1]]);
    assert_eq!(a1_only, a1);

    let plan = planner
        .plan(&without_a2, &world, &[g1, g2], None)
        .expect("plan");
    assert_eq!(plan.goal(), g1);
    assert_eq!(plan.steps(), vec![a1_only]);
}

#[test]
fn most_recent_goal_loses_a_priority_tie() {
    let (mut model, b) = facts_model(2);
    model.add_action(action("a1", 1.0, &[], &[b[0]])).unwrap();
    model.add_action(action("a2", 1.0, &[], &[b[1]])).unwrap();
    let g1 = goal(&mut model, "g1", 1.0, &[b[0]]);
    let g2 = goal(&mut model, "g2", 1.0, &[b[1]]);
    let world = Facts(vec![false, false]);

    let mut planner = planner();
    let fresh = planner.plan(&model, &world, &[g1, g2], None).expect("plan");
    assert_eq!(fresh.goal(), g1);
    planner.release_plan(fresh);

    let plan = planner
        .plan(&model, &world, &[g1, g2], Some(g1))
        .expect("plan");
    assert_eq!(plan.goal(), g2);
}

#[test]
fn recency_tie_break_holds_for_small_priorities_and_coarse_scales() {
    let (mut model, b) = facts_model(2);
    model.add_action(action("a1", 1.0, &[], &[b[0]])).unwrap();
    model.add_action(action("a2", 1.0, &[], &[b[1]])).unwrap();
    let g1 = goal(&mut model, "g1", 0.005, &[b[0]]);
    let g2 = goal(&mut model, "g2", 0.005, &[b[1]]);
    let world = Facts(vec![false, false]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &world, &[g1, g2], Some(g1))
        .expect("plan");
    assert_eq!(plan.goal(), g2);
    planner.release_plan(plan);

    let mut coarse =
        self::planner().with_config(PlannerConfig::default().with_priority_scale(10.0));
    let plan = coarse
        .plan(&model, &world, &[g1, g2], Some(g1))
        .expect("plan");
    assert_eq!(plan.goal(), g2);
}

#[test]
fn satisfied_goals_are_never_planned_for() {
    let (mut model, b) = facts_model(2);
    model.add_action(action("a1", 1.0, &[], &[b[0]])).unwrap();
    model.add_action(action("a2", 1.0, &[], &[b[1]])).unwrap();
    let g1 = goal(&mut model, "g1", 1.0, &[b[0]]);
    let g2 = goal(&mut model, "g2", 5.0, &[b[1]]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &Facts(vec![false, true]), &[g1, g2], None)
        .expect("plan");
    assert_eq!(plan.goal(), g1);

    assert!(planner
        .plan(&model, &Facts(vec![true, true]), &[g1, g2], None)
        .is_none());
}

#[test]
fn chains_preconditions_in_execution_order() {
    let (mut model, b) = facts_model(3);
    let make_wood = model.add_action(action("wood", 1.0, &[], &[b[0]])).unwrap();
    let make_plank = model
        .add_action(action("plank", 2.0, &[b[0]], &[b[1]]))
        .unwrap();
    let make_table = model
        .add_action(action("table", 3.0, &[b[1]], &[b[2]]))
        .unwrap();
    let g = goal(&mut model, "table", 1.0, &[b[2]]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &Facts(vec![false; 3]), &[g], None)
        .expect("plan");
    assert_eq!(plan.steps(), vec![make_wood, make_plank, make_table]);
    assert_eq!(plan.total_cost(), 6.0);
}

#[test]
fn preconditions_true_in_the_world_are_not_planned() {
    let (mut model, b) = facts_model(2);
    model.add_action(action("fetch", 1.0, &[], &[b[0]])).unwrap();
    let use_it = model
        .add_action(action("use", 1.0, &[b[0]], &[b[1]]))
        .unwrap();
    let g = goal(&mut model, "done", 1.0, &[b[1]]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &Facts(vec![true, false]), &[g], None)
        .expect("plan");
    assert_eq!(plan.steps(), vec![use_it]);
    assert_eq!(plan.total_cost(), 1.0);
}

#[test]
fn cheaper_two_step_route_beats_expensive_shortcut() {
    let (mut model, b) = facts_model(2);
    let prep = model.add_action(action("prep", 1.0, &[], &[b[0]])).unwrap();
    let finish = model
        .add_action(action("finish", 1.0, &[b[0]], &[b[1]]))
        .unwrap();
    model
        .add_action(action("shortcut", 5.0, &[], &[b[1]]))
        .unwrap();
    let g = goal(&mut model, "done", 1.0, &[b[1]]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &Facts(vec![false; 2]), &[g], None)
        .expect("plan");
    assert_eq!(plan.steps(), vec![prep, finish]);
    assert_eq!(plan.total_cost(), 2.0);
}

#[test]
fn mutually_dependent_actions_terminate_without_a_plan() {
    let (mut model, b) = facts_model(2);
    model.add_action(action("x_from_y", 1.0, &[b[1]], &[b[0]])).unwrap();
    model.add_action(action("y_from_x", 1.0, &[b[0]], &[b[1]])).unwrap();
    let g = goal(&mut model, "y", 1.0, &[b[1]]);

    let mut planner = planner();
    assert!(planner
        .plan(&model, &Facts(vec![false; 2]), &[g], None)
        .is_none());
    assert_eq!(planner.pool_report().search_outstanding(), 0);
}

#[test]
fn self_sustaining_action_is_not_a_way_out() {
    let (mut model, b) = facts_model(1);
    model.add_action(action("loop", 1.0, &[b[0]], &[b[0]])).unwrap();
    let g = goal(&mut model, "g", 1.0, &[b[0]]);

    let mut planner = planner();
    assert!(planner.plan(&model, &Facts(vec![false]), &[g], None).is_none());
}

#[test]
fn exhausted_budget_moves_on_to_the_next_goal() {
    let (mut model, b) = facts_model(3);
    model.add_action(action("a", 1.0, &[], &[b[0]])).unwrap();
    model.add_action(action("b", 1.0, &[b[0]], &[b[1]])).unwrap();
    let quick = model.add_action(action("c", 1.0, &[], &[b[2]])).unwrap();
    let deep = goal(&mut model, "deep", 9.0, &[b[1]]);
    let shallow = goal(&mut model, "shallow", 1.0, &[b[2]]);
    let world = Facts(vec![false; 3]);

    let mut tight = planner().with_config(PlannerConfig::default().with_max_expansions(2));
    let plan = tight
        .plan(&model, &world, &[deep, shallow], None)
        .expect("plan");
    assert_eq!(plan.goal(), shallow);
    assert_eq!(plan.steps(), vec![quick]);

    let mut roomy = planner();
    let plan = roomy
        .plan(&model, &world, &[deep, shallow], None)
        .expect("plan");
    assert_eq!(plan.goal(), deep);
    assert_eq!(plan.len(), 2);
}

#[test]
fn irrelevant_actions_never_appear_in_plans() {
    let (mut model, b) = facts_model(3);
    let useful = model.add_action(action("useful", 1.0, &[], &[b[0]])).unwrap();
    for i in 0..8 {
        model
            .add_action(action(&format!("noise{i}"), 0.1, &[], &[b[2]]))
            .unwrap();
    }
    let g = goal(&mut model, "g", 1.0, &[b[0]]);

    let mut planner = planner();
    let plan = planner
        .plan(&model, &Facts(vec![false; 3]), &[g], None)
        .expect("plan");
    assert_eq!(plan.steps(), vec![useful]);
}
