//! Planning prompt for the desktop operator.

use crate::agent::history::Turn;

/// Build the per-turn planning prompt from task, current state, and history.
pub fn build_planning_prompt(objective: &str, state: &str, history: &[Turn]) -> String {
    let history_block = if history.is_empty() {
        "(none yet)".to_string()
    } else {
        history
            .iter()
            .map(Turn::history_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are an autonomous desktop operator. You have Windows-MCP tools that can interact with the local Windows desktop.

Goal: {objective}

Current state (from MCP):
{state}

Completed actions:
{history_block}

Rules:
- Propose exactly one tool call per turn, the single best next step.
- Do not invent tools. Only use the provided functions.
- If a previous action failed or was blocked, adapt instead of repeating it.
- When the task is complete, call finish_task with a short summary."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::history::TurnOutcome;
    use chrono::Utc;

    #[test]
    fn prompt_contains_goal_and_state() {
        let prompt = build_planning_prompt("Open notepad", "desktop idle", &[]);
        assert!(prompt.contains("Goal: Open notepad"));
        assert!(prompt.contains("desktop idle"));
        assert!(prompt.contains("(none yet)"));
    }

    #[test]
    fn prompt_lists_history_in_order() {
        let history = vec![
            Turn {
                index: 0,
                observed: "a".to_string(),
                action: None,
                outcome: TurnOutcome::PlannerInvalid {
                    reason: "first".to_string(),
                },
                at: Utc::now(),
            },
            Turn {
                index: 1,
                observed: "b".to_string(),
                action: None,
                outcome: TurnOutcome::PlannerInvalid {
                    reason: "second".to_string(),
                },
                at: Utc::now(),
            },
        ];
        let prompt = build_planning_prompt("task", "state", &history);
        let first = prompt.find("first").unwrap();
        let second = prompt.find("second").unwrap();
        assert!(first < second);
    }
}
