//! Agent module - the orchestrating control loop.
//!
//! One turn of the loop:
//! 1. Query the tool bridge for the current environment state
//! 2. Ask the planner for exactly one action (or a stop signal)
//! 3. Dispatch the action and append the result to history
//! 4. Repeat until the stop signal or the turn limit

mod agent_loop;
mod history;
mod prompt;

pub use agent_loop::Agent;
pub use history::{RunOutcome, RunReport, Turn, TurnOutcome};
pub use prompt::build_planning_prompt;
