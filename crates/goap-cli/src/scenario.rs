//! YAML scenario files.
//!
//! A scenario declares boolean facts (one belief per fact), goals over those beliefs and
//! actions whose completion sets their effect facts.

use std::path::Path;

use anyhow::{Context, Result};
use goap_core::{
    AgentAction, BeliefId, Goal, GoalId, GoapError, GoapModel, InstantStrategy, TimedStrategy,
};
use goap_planner::{AgentConfig, PlannerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("{owner} references unknown belief `{belief}`")]
    UnknownBelief { owner: String, belief: String },

    #[error("goal `{0}` is not declared")]
    UnknownGoal(String),

    #[error(transparent)]
    Model(#[from] GoapError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: Option<String>,
    pub beliefs: Vec<BeliefSpec>,
    pub goals: Vec<GoalSpec>,
    pub actions: Vec<ActionSpec>,
    pub planner: PlannerConfig,
    pub agent: AgentConfig,
    /// Goal pursued most recently, for the recency tie-break of `plan`.
    pub most_recent_goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefSpec {
    pub name: String,
    #[serde(default)]
    pub initial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSpec {
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: f32,
    #[serde(default)]
    pub desired: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    /// Seconds of simulated time the action takes; instant when absent.
    #[serde(default)]
    pub duration: Option<f32>,
}

fn default_priority() -> f32 {
    1.0
}

fn default_cost() -> f32 {
    1.0
}

/// The simulated world: one flag per declared belief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioWorld {
    pub facts: Vec<bool>,
}

impl ScenarioWorld {
    pub fn fact(&self, index: usize) -> bool {
        self.facts.get(index).copied().unwrap_or(false)
    }

    fn set(&mut self, index: usize) {
        if let Some(fact) = self.facts.get_mut(index) {
            *fact = true;
        }
    }
}

/// A scenario turned into a model plus its initial world.
pub struct Built {
    pub model: GoapModel<ScenarioWorld>,
    pub world: ScenarioWorld,
    pub goals: Vec<GoalId>,
    pub most_recent: Option<GoalId>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn build(&self) -> std::result::Result<Built, ScenarioError> {
        let mut model = GoapModel::new();
        for (index, belief) in self.beliefs.iter().enumerate() {
            model.add_belief(belief.name.clone(), move |w: &ScenarioWorld| w.fact(index))?;
        }

        for spec in &self.actions {
            let preconditions = self.resolve(&model, &spec.name, &spec.preconditions)?;
            let effects = self.resolve(&model, &spec.name, &spec.effects)?;

            let facts: Vec<usize> = effects.iter().map(|id| id.index()).collect();
            let apply = move |w: &mut ScenarioWorld| {
                for index in &facts {
                    w.set(*index);
                }
            };

            let mut action = AgentAction::new(spec.name.clone()).with_cost(spec.cost);
            action = match spec.duration {
                Some(duration) => {
                    action.with_strategy(TimedStrategy::new(duration).with_on_complete(apply))
                }
                None => action.with_strategy(InstantStrategy::new().with_on_complete(apply)),
            };
            for id in preconditions {
                action = action.with_precondition(id);
            }
            for id in effects {
                action = action.with_effect(id);
            }
            model.add_action(action)?;
        }

        let mut goals = Vec::with_capacity(self.goals.len());
        for spec in &self.goals {
            let mut goal = Goal::new(spec.name.clone()).with_priority(spec.priority);
            for id in self.resolve(&model, &spec.name, &spec.desired)? {
                goal = goal.with_desired_effect(id);
            }
            goals.push(model.add_goal(goal)?);
        }

        let most_recent = match self.most_recent_goal.as_deref() {
            Some(name) => Some(
                model
                    .goal_id(name)
                    .ok_or_else(|| ScenarioError::UnknownGoal(name.to_string()))?,
            ),
            None => None,
        };

        let world = ScenarioWorld {
            facts: self.beliefs.iter().map(|b| b.initial).collect(),
        };

        Ok(Built {
            model,
            world,
            goals,
            most_recent,
        })
    }

    fn resolve(
        &self,
        model: &GoapModel<ScenarioWorld>,
        owner: &str,
        names: &[String],
    ) -> std::result::Result<Vec<BeliefId>, ScenarioError> {
        names
            .iter()
            .map(|name| {
                model
                    .belief_id(name)
                    .ok_or_else(|| ScenarioError::UnknownBelief {
                        owner: owner.to_string(),
                        belief: name.clone(),
                    })
            })
            .collect()
    }
}
