//! Tool bridge - exposes a remote automation tool server as callable actions.
//!
//! The bridge owns three concerns:
//! 1. Discovery: fetch (or fall back to) the server's tool registry once, at
//!    connect time, and cache it for the lifetime of the run.
//! 2. State: query the current environment snapshot before each planning step.
//! 3. Dispatch: execute a validated action against the server, bounded by a
//!    timeout, with a local safety guard applied first.

mod catalog;
mod guard;
mod http;

pub use catalog::builtin_catalog;
pub use guard::SafetyPolicy;
pub use http::McpHttpBridge;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name of the tool that captures the current desktop state.
pub const STATE_TOOL: &str = "State-Tool";

/// Errors produced by the tool bridge.
///
/// All variants are recoverable from the agent loop's point of view: they are
/// recorded in history and fed back to the planner rather than aborting the run.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The local safety guard refused to dispatch the action.
    #[error("blocked by safety guard: {reason}")]
    Rejected { reason: String },

    /// The action names a tool the server never advertised.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The server answered with a non-success status on every known path.
    #[error("tool server returned status {status}: {detail}")]
    Remote { status: u16, detail: String },

    /// The server could not be reached at all (connect failure or timeout).
    #[error("could not reach tool server at {url}: {detail}")]
    Unreachable { url: String, detail: String },
}

/// Schema of one remote capability, as advertised by the tool server.
///
/// The same shape is forwarded to the planner as a function declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub parameters: Value,
}

/// A single validated tool invocation proposed by the planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolAction {
    pub name: String,
    pub arguments: serde_json::Map<String, Value>,
}

impl ToolAction {
    pub fn new(name: impl Into<String>, arguments: serde_json::Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Compact rendering of the argument map for logs and history lines.
    pub fn render_arguments(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Structured data returned by a remote tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub body: Value,
}

impl ToolResult {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Render the result as a single line of text for history and prompts.
    pub fn render(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_else(|_| "<unrenderable>".into()),
        }
    }
}

/// Base64-encoded screen capture attached to a state snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Screenshot {
    pub media_type: String,
    pub data: String,
}

impl Screenshot {
    /// Decoded payload size in bytes; zero when the payload is not valid base64.
    pub fn decoded_len(&self) -> usize {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map(|b| b.len())
            .unwrap_or(0)
    }
}

/// The environment snapshot observed at the start of a turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateSnapshot {
    /// Textual description of the environment (UI tree, focused window, ...).
    pub text: String,
    /// Screen capture, present only when vision was requested.
    pub screenshot: Option<Screenshot>,
}

/// The adapter between the agent loop and a remote tool server.
///
/// Implementations must not retry internally; retry decisions belong to the
/// caller, which records failures as turns and lets the planner adapt.
#[async_trait]
pub trait ToolBridge: Send + Sync {
    /// Tool registry discovered at connect time, cached for the run.
    fn specs(&self) -> &[ToolSpec];

    /// Capture the current environment snapshot.
    async fn state(&self, use_vision: bool) -> Result<StateSnapshot, BridgeError>;

    /// Execute one action and return its result or a structured failure.
    async fn dispatch(&self, action: &ToolAction) -> Result<ToolResult, BridgeError>;
}
