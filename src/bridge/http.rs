//! HTTP implementation of the tool bridge for Windows-MCP style servers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{
    builtin_catalog, BridgeError, SafetyPolicy, StateSnapshot, Screenshot, ToolAction,
    ToolBridge, ToolResult, ToolSpec, STATE_TOOL,
};

/// Bridge to a tool server reachable over HTTP.
///
/// Path conventions are a local mapping: the bridge first posts to the shared
/// `/call` endpoint and falls back to the per-tool `/tools/{name}` form, so it
/// works against both deployment styles without reconfiguration.
pub struct McpHttpBridge {
    client: reqwest::Client,
    base_url: String,
    specs: Vec<ToolSpec>,
    policy: SafetyPolicy,
}

impl McpHttpBridge {
    /// Connect to the server: build the HTTP client and discover the tool
    /// registry. Discovery failure is not fatal; the built-in Windows-MCP
    /// catalog is used instead.
    pub async fn connect(
        base_url: &str,
        timeout: Duration,
        policy: SafetyPolicy,
    ) -> Result<Self, BridgeError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Unreachable {
                url: base_url.clone(),
                detail: e.to_string(),
            })?;

        let specs = match discover(&client, &base_url).await {
            Ok(specs) => {
                debug!(count = specs.len(), "discovered tool registry");
                specs
            }
            Err(err) => {
                warn!(%err, "tool discovery failed; using built-in catalog");
                builtin_catalog()
            }
        };

        Ok(Self {
            client,
            base_url,
            specs,
            policy,
        })
    }

    /// Raw invocation, shared by `state` and `dispatch`.
    ///
    /// When both paths fail, the first `Remote` error is reported: the shared
    /// endpoint's response (e.g. a 500 with the tool's error body) carries the
    /// useful detail, while the fallback path typically answers with a bare
    /// 404/405 that would mask it.
    async fn invoke(&self, name: &str, arguments: &Value) -> Result<Value, BridgeError> {
        let mut remote_error: Option<BridgeError> = None;
        let mut transport_error: Option<BridgeError> = None;

        // Shared endpoint first, per-tool endpoint second.
        let attempts = [
            (
                format!("{}/call", self.base_url),
                json!({"name": name, "arguments": arguments}),
            ),
            (format!("{}/tools/{}", self.base_url, name), arguments.clone()),
        ];

        for (url, payload) in attempts {
            debug!(%url, tool = name, "dispatching tool call");
            match self.client.post(&url).json(&payload).send().await {
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.map_err(|e| BridgeError::Unreachable {
                        url: url.clone(),
                        detail: e.to_string(),
                    })?;
                    if status.is_success() {
                        return Ok(parse_body(&text));
                    }
                    if remote_error.is_none() {
                        remote_error = Some(BridgeError::Remote {
                            status: status.as_u16(),
                            detail: truncate(&text, 500),
                        });
                    }
                }
                Err(err) => {
                    transport_error = Some(BridgeError::Unreachable {
                        url: url.clone(),
                        detail: err.to_string(),
                    });
                }
            }
        }

        Err(remote_error
            .or(transport_error)
            .unwrap_or_else(|| BridgeError::Unreachable {
                url: self.base_url.clone(),
                detail: "no dispatch path attempted".to_string(),
            }))
    }
}

#[async_trait]
impl ToolBridge for McpHttpBridge {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn state(&self, use_vision: bool) -> Result<StateSnapshot, BridgeError> {
        let body = self
            .invoke(STATE_TOOL, &json!({"use_vision": use_vision}))
            .await?;
        Ok(snapshot_from(body))
    }

    async fn dispatch(&self, action: &ToolAction) -> Result<ToolResult, BridgeError> {
        if !self.specs.iter().any(|t| t.name == action.name) {
            return Err(BridgeError::UnknownTool(action.name.clone()));
        }
        if let Err(reason) = self.policy.check(action) {
            return Err(BridgeError::Rejected { reason });
        }

        let arguments = Value::Object(action.arguments.clone());
        let body = self.invoke(&action.name, &arguments).await?;
        Ok(ToolResult::new(body))
    }
}

/// Fetch the tool registry from the discovery endpoint.
async fn discover(client: &reqwest::Client, base_url: &str) -> Result<Vec<ToolSpec>, BridgeError> {
    let url = format!("{base_url}/tools");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| BridgeError::Unreachable {
            url: url.clone(),
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BridgeError::Remote {
            status: status.as_u16(),
            detail: format!("discovery endpoint {url} not available"),
        });
    }

    let body: Value = response.json().await.map_err(|e| BridgeError::Unreachable {
        url,
        detail: e.to_string(),
    })?;
    parse_registry(&body).ok_or_else(|| BridgeError::Remote {
        status: status.as_u16(),
        detail: "discovery endpoint returned an unrecognized shape".to_string(),
    })
}

/// Accept both a bare array of specs and a `{"tools": [...]}` wrapper.
fn parse_registry(body: &Value) -> Option<Vec<ToolSpec>> {
    let list = match body {
        Value::Array(_) => body,
        Value::Object(map) => map.get("tools")?,
        _ => return None,
    };
    let specs: Vec<ToolSpec> = serde_json::from_value(list.clone()).ok()?;
    if specs.is_empty() {
        None
    } else {
        Some(specs)
    }
}

/// Tool responses may be JSON or plain text.
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Split a state response into text snapshot and optional screenshot payload.
fn snapshot_from(body: Value) -> StateSnapshot {
    let Value::Object(mut map) = body else {
        return StateSnapshot {
            text: match body {
                Value::String(s) => s,
                other => other.to_string(),
            },
            screenshot: None,
        };
    };

    let screenshot = map.remove("screenshot").and_then(|v| match v {
        Value::String(data) => Some(Screenshot {
            media_type: "image/png".to_string(),
            data,
        }),
        Value::Object(shot) => Some(Screenshot {
            media_type: shot
                .get("media_type")
                .and_then(|m| m.as_str())
                .unwrap_or("image/png")
                .to_string(),
            data: shot.get("data").and_then(|d| d.as_str())?.to_string(),
        }),
        _ => None,
    });

    let text = match map.remove("text") {
        Some(Value::String(s)) => s,
        _ => Value::Object(map).to_string(),
    };

    StateSnapshot { text, screenshot }
}

/// Truncate a string for error details and logs.
fn truncate(s: &str, max_len: usize) -> String {
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
