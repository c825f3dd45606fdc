mod compare;
mod types;

pub use compare::{Differ, plan_diff};
pub use types::{Action, ActionType, DiffOp};
