//! Planner client - turns task state into a single proposed action.

mod gemini;

pub use gemini::GeminiPlanner;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::bridge::{ToolAction, ToolSpec};

/// Reserved action name that ends a run successfully.
pub const FINISH_TOOL: &str = "finish_task";

/// Fatal planner failures. Unlike bridge errors these abort the run: with no
/// next action there is nothing to feed back into history.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("planner API returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// What the planner decided for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Dispatch this validated action.
    Action(ToolAction),
    /// Stop signal: the task is done.
    Finish { summary: String },
    /// The model proposed an unknown tool or malformed arguments.
    /// Recoverable: recorded as a failed turn so the model can correct itself.
    Invalid { reason: String },
}

/// Everything the planner needs for one planning call.
pub struct PlanRequest<'a> {
    /// The user-supplied objective, unchanged for the whole run.
    pub objective: &'a str,
    /// Fully rendered planning prompt (state + history already included).
    pub prompt: &'a str,
    /// Capabilities advertised by the tool bridge for this run.
    pub tools: &'a [ToolSpec],
}

/// A planner proposes at most one action per turn. One planning call per
/// turn - no internal retries.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, request: PlanRequest<'_>) -> Result<Plan, PlannerError>;
}

/// Declaration of the reserved stop action, appended to every tool set sent
/// to the model.
pub fn finish_tool_spec() -> ToolSpec {
    ToolSpec {
        name: FINISH_TOOL.to_string(),
        description: "Conclude the task and provide a short summary of the completed work."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "One sentence describing what was accomplished."
                }
            },
            "required": ["summary"]
        }),
    }
}
