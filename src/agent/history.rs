//! Run history types: turns, outcomes, and the final report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::bridge::ToolAction;

/// How a single turn ended.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The dispatched tool call succeeded.
    Success { result: String },
    /// The remote call failed or timed out, or the state query failed.
    ToolFailure { reason: String },
    /// The local safety guard refused to dispatch the action.
    SafetyRejected { reason: String },
    /// The planner proposed an unknown tool or malformed arguments.
    PlannerInvalid { reason: String },
}

/// One completed cycle of state query, plan, and dispatch.
///
/// Turns are append-only: once pushed to history they are never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    /// Zero-based position in the run.
    pub index: usize,
    /// Digest of the environment state observed before planning.
    pub observed: String,
    /// The action proposed by the planner, when one was well-formed.
    pub action: Option<ToolAction>,
    pub outcome: TurnOutcome,
    pub at: DateTime<Utc>,
}

impl Turn {
    /// One-line rendering used in the planning prompt, so the model can see
    /// what already happened, including its own mistakes.
    pub fn history_line(&self) -> String {
        match (&self.action, &self.outcome) {
            (Some(action), TurnOutcome::Success { result }) => format!(
                "- tool={} args={} -> {}",
                action.name,
                action.render_arguments(),
                result
            ),
            (Some(action), TurnOutcome::ToolFailure { reason }) => format!(
                "- tool={} args={} -> FAILED: {}",
                action.name,
                action.render_arguments(),
                reason
            ),
            (Some(action), TurnOutcome::SafetyRejected { reason }) => format!(
                "- tool={} args={} -> BLOCKED: {}",
                action.name,
                action.render_arguments(),
                reason
            ),
            (None, TurnOutcome::ToolFailure { reason }) => {
                format!("- state query failed: {reason}")
            }
            (_, TurnOutcome::PlannerInvalid { reason }) => {
                format!("- invalid proposal: {reason}")
            }
            (None, outcome) => format!("- {outcome:?}"),
        }
    }
}

/// Terminal state of a run that did not abort.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The planner called the stop action with a summary of the work done.
    Finished { summary: String },
    /// The turn limit was reached without a stop action. Not an error, but
    /// distinct from success so callers can tell "done" from "gave up".
    Exhausted,
}

/// The full record of a run: outcome plus the ordered turn history.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub task: String,
    pub outcome: RunOutcome,
    pub history: Vec<Turn>,
}

impl RunReport {
    pub fn is_finished(&self) -> bool {
        matches!(self.outcome, RunOutcome::Finished { .. })
    }
}
