//! # operate-agent
//!
//! An autonomous desktop operator: a Gemini planner driving a Windows-MCP
//! tool server.
//!
//! This library provides:
//! - An agent loop that alternates between observing desktop state, planning,
//!   and dispatching tool calls
//! - A planner client for the Gemini function-calling API
//! - An HTTP tool bridge for Windows-MCP style servers, with a local safety
//!   guard
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Query the tool server for the current environment snapshot
//! 2. Send task, history, and state to the planner with the declared tool set
//! 3. Receive exactly one proposed action, or the reserved `finish_task` stop
//!    signal
//! 4. Dispatch the action, append the result to history, repeat until the stop
//!    signal or the turn limit
//!
//! Recoverable failures (remote errors, timeouts, guard rejections, invalid
//! proposals) are recorded as turns so the planner can adapt; only a planner
//! transport failure aborts a run.
//!
//! ## Example
//!
//! ```rust,ignore
//! use operate_agent::{agent::Agent, bridge::{McpHttpBridge, SafetyPolicy}, planner::GeminiPlanner};
//!
//! let bridge = McpHttpBridge::connect("http://localhost:8000", timeout, SafetyPolicy::default()).await?;
//! let planner = GeminiPlanner::new(api_key, "gemini-2.0-flash-exp");
//! let agent = Agent::new(Box::new(planner), Box::new(bridge), 12, false);
//! let report = agent.run("Open notepad and type hello").await?;
//! ```

pub mod agent;
pub mod bridge;
pub mod config;
pub mod planner;

pub use config::Config;
