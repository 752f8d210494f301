//! Core agent loop implementation.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::history::{RunOutcome, RunReport, Turn, TurnOutcome};
use crate::agent::prompt::build_planning_prompt;
use crate::bridge::{BridgeError, ToolAction, ToolBridge};
use crate::planner::{Plan, PlanRequest, Planner, PlannerError};

/// Discrete states of the loop. The `Err` path of [`Agent::run`] is the
/// aborted state: a planner transport failure with no recovery.
enum LoopState {
    /// Query the environment and ask the planner for the next action.
    Planning,
    /// Execute a validated action against the tool bridge.
    Dispatching { observed: String, action: ToolAction },
    /// The planner signalled completion.
    Finished { summary: String },
    /// Turn limit reached without a stop signal.
    Exhausted,
}

/// The autonomous operator: drives the turn-by-turn interaction between the
/// planner and the tool bridge until completion or turn limit.
pub struct Agent {
    planner: Box<dyn Planner>,
    bridge: Box<dyn ToolBridge>,
    max_turns: usize,
    use_vision: bool,
}

impl Agent {
    pub fn new(
        planner: Box<dyn Planner>,
        bridge: Box<dyn ToolBridge>,
        max_turns: usize,
        use_vision: bool,
    ) -> Self {
        Self {
            planner,
            bridge,
            max_turns,
            use_vision,
        }
    }

    /// Run the loop for one task.
    ///
    /// Bridge failures (remote errors, timeouts, guard rejections) and invalid
    /// planner proposals are recorded as turns and fed back to the next
    /// planning call. Only a planner transport failure aborts with `Err`.
    pub async fn run(&self, task: &str) -> Result<RunReport, PlannerError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, task, max_turns = self.max_turns, "starting run");

        let mut history: Vec<Turn> = Vec::new();
        let mut state = LoopState::Planning;

        loop {
            state = match state {
                LoopState::Planning => {
                    if history.len() >= self.max_turns {
                        LoopState::Exhausted
                    } else {
                        self.plan_turn(task, &mut history).await?
                    }
                }
                LoopState::Dispatching { observed, action } => {
                    self.dispatch_turn(observed, action, &mut history).await
                }
                LoopState::Finished { summary } => {
                    info!(%run_id, turns = history.len(), "task finished");
                    return Ok(RunReport {
                        run_id,
                        task: task.to_string(),
                        outcome: RunOutcome::Finished { summary },
                        history,
                    });
                }
                LoopState::Exhausted => {
                    warn!(%run_id, turns = history.len(), "turn limit reached without finish");
                    return Ok(RunReport {
                        run_id,
                        task: task.to_string(),
                        outcome: RunOutcome::Exhausted,
                        history,
                    });
                }
            };
        }
    }

    /// One planning step: observe state, ask the planner, decide what's next.
    async fn plan_turn(
        &self,
        task: &str,
        history: &mut Vec<Turn>,
    ) -> Result<LoopState, PlannerError> {
        let index = history.len();

        let snapshot = match self.bridge.state(self.use_vision).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(turn = index, %err, "state query failed; recording and continuing");
                history.push(Turn {
                    index,
                    observed: String::new(),
                    action: None,
                    outcome: TurnOutcome::ToolFailure {
                        reason: err.to_string(),
                    },
                    at: Utc::now(),
                });
                return Ok(LoopState::Planning);
            }
        };

        if let Some(shot) = &snapshot.screenshot {
            debug!(
                turn = index,
                bytes = shot.decoded_len(),
                media_type = %shot.media_type,
                "state includes screenshot"
            );
        }

        let prompt = build_planning_prompt(task, &snapshot.text, history);
        let plan = self
            .planner
            .plan(PlanRequest {
                objective: task,
                prompt: &prompt,
                tools: self.bridge.specs(),
            })
            .await?;

        let observed = truncate_for_log(&snapshot.text, 1000);
        match plan {
            Plan::Finish { summary } => Ok(LoopState::Finished { summary }),
            Plan::Invalid { reason } => {
                info!(turn = index, %reason, "planner proposal rejected");
                history.push(Turn {
                    index,
                    observed,
                    action: None,
                    outcome: TurnOutcome::PlannerInvalid { reason },
                    at: Utc::now(),
                });
                Ok(LoopState::Planning)
            }
            Plan::Action(action) => {
                info!(
                    turn = index,
                    tool = %action.name,
                    args = %action.render_arguments(),
                    "planner proposed action"
                );
                Ok(LoopState::Dispatching { observed, action })
            }
        }
    }

    /// Execute one action and append the resulting turn.
    async fn dispatch_turn(
        &self,
        observed: String,
        action: ToolAction,
        history: &mut Vec<Turn>,
    ) -> LoopState {
        let index = history.len();

        let outcome = match self.bridge.dispatch(&action).await {
            Ok(result) => {
                let rendered = truncate_for_log(&result.render(), 1000);
                info!(turn = index, tool = %action.name, "tool call succeeded");
                TurnOutcome::Success { result: rendered }
            }
            Err(BridgeError::Rejected { reason }) => {
                warn!(turn = index, tool = %action.name, %reason, "dispatch blocked by safety guard");
                TurnOutcome::SafetyRejected { reason }
            }
            Err(err) => {
                warn!(turn = index, tool = %action.name, %err, "tool call failed");
                TurnOutcome::ToolFailure {
                    reason: err.to_string(),
                }
            }
        };

        history.push(Turn {
            index,
            observed,
            action: Some(action),
            outcome,
            at: Utc::now(),
        });
        LoopState::Planning
    }
}

/// Truncate a string for history digests and logs.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}
