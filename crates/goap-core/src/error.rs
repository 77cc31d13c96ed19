use thiserror::Error;

/// Errors raised while building a [`GoapModel`](crate::GoapModel).
///
/// Planning itself never fails: "no plan" is a normal outcome and is reported as `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GoapError {
    #[error("belief `{0}` is already registered")]
    DuplicateBelief(String),

    #[error("goal `{0}` is already registered")]
    DuplicateGoal(String),

    #[error("action `{0}` is already registered")]
    DuplicateAction(String),

    #[error("unknown belief `{0}`")]
    UnknownBelief(String),

    #[error("`{owner}` references unknown belief id {id}")]
    UnknownBeliefId { owner: String, id: u32 },

    #[error("unknown goal id {0}")]
    UnknownGoal(u32),

    #[error("action `{action}` has invalid cost {cost} (must be finite and >= 0)")]
    InvalidCost { action: String, cost: f32 },

    #[error("goal `{goal}` has invalid priority {priority} (must be finite)")]
    InvalidPriority { goal: String, priority: f32 },
}

pub type Result<T> = std::result::Result<T, GoapError>;
