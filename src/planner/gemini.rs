//! Gemini function-calling planner.

use serde_json::{json, Map, Value};
use tracing::debug;

use async_trait::async_trait;

use crate::bridge::{ToolAction, ToolSpec};

use super::{finish_tool_spec, Plan, PlanRequest, Planner, PlannerError, FINISH_TOOL};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Planner backed by the Gemini `generateContent` endpoint with function
/// calling forced on (`mode: ANY`).
pub struct GeminiPlanner {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiPlanner {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl Planner for GeminiPlanner {
    async fn plan(&self, request: PlanRequest<'_>) -> Result<Plan, PlannerError> {
        let mut declarations: Vec<&ToolSpec> = request.tools.iter().collect();
        let finish = finish_tool_spec();
        declarations.push(&finish);

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": request.prompt}]
            }],
            "tools": [{"functionDeclarations": declarations}],
            "toolConfig": {"functionCallingConfig": {"mode": "ANY"}}
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        debug!(model = %self.model, objective = request.objective, "requesting plan");
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let payload: Value = response.json().await?;
        Ok(interpret_response(&payload, request.tools))
    }
}

/// Map a `generateContent` response onto a [`Plan`].
///
/// The first well-formed function call wins; a JSON text payload of the form
/// `{"tool": ..., "arguments": ...}` is accepted as a fallback when the model
/// bypassed function calling. Anything else is a recoverable invalid plan.
fn interpret_response(payload: &Value, tools: &[ToolSpec]) -> Plan {
    let Some(parts) = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
    else {
        return Plan::Invalid {
            reason: "response contained no candidates".to_string(),
        };
    };

    let calls: Vec<&Value> = parts.iter().filter_map(|p| p.get("functionCall")).collect();
    if calls.len() > 1 {
        debug!(extra = calls.len() - 1, "ignoring additional function calls");
    }
    if let Some(call) = calls.first() {
        return plan_from_call(
            call.get("name").and_then(Value::as_str),
            call.get("args"),
            tools,
        );
    }

    // Fallback: JSON text payload when function calling was not used.
    for part in parts {
        let Some(text) = part.get("text").and_then(Value::as_str) else {
            continue;
        };
        if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
            if let Some(tool) = value.get("tool").and_then(Value::as_str) {
                return plan_from_call(Some(tool), value.get("arguments"), tools);
            }
        }
    }

    Plan::Invalid {
        reason: "model returned no tool call".to_string(),
    }
}

/// Validate a proposed call against the declared capability set.
fn plan_from_call(name: Option<&str>, args: Option<&Value>, tools: &[ToolSpec]) -> Plan {
    let Some(name) = name else {
        return Plan::Invalid {
            reason: "function call had no name".to_string(),
        };
    };

    let arguments: Map<String, Value> = match args {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Plan::Invalid {
                reason: format!("arguments for '{name}' were not an object: {other}"),
            }
        }
    };

    if name == FINISH_TOOL {
        let summary = arguments
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Plan::Finish { summary };
    }

    if !tools.iter().any(|t| t.name == name) {
        return Plan::Invalid {
            reason: format!("unknown tool '{name}'"),
        };
    }

    Plan::Action(ToolAction::new(name, arguments))
}
