//! Local safety guard applied before dispatching actions to the tool server.
//!
//! The guard is a last line of defense for actions that can reach outside the
//! expected scope of a desktop automation run. A rejection is surfaced to the
//! loop as a failed turn, never executed.

use super::ToolAction;

/// PowerShell fragments that are never dispatched, regardless of task.
const BLOCKED_POWERSHELL: &[&str] = &[
    "format-volume",
    "clear-disk",
    "stop-computer",
    "restart-computer",
    "shutdown",
    "reg delete",
    "remove-item -recurse -force c:\\",
    "rd /s",
    "cipher /w",
];

/// Guard configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct SafetyPolicy {
    /// When set, App-Tool may only launch or switch to these applications.
    pub allowed_apps: Option<Vec<String>>,
}

impl SafetyPolicy {
    pub fn new(allowed_apps: Option<Vec<String>>) -> Self {
        Self { allowed_apps }
    }

    /// Check an action against the policy. Returns the rejection reason if the
    /// action must not be dispatched.
    pub fn check(&self, action: &ToolAction) -> Result<(), String> {
        match action.name.as_str() {
            "Powershell-Tool" => self.check_powershell(action),
            "App-Tool" => self.check_app(action),
            "Scrape-Tool" => self.check_scrape(action),
            _ => Ok(()),
        }
    }

    fn check_powershell(&self, action: &ToolAction) -> Result<(), String> {
        let command = action
            .arguments
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_lowercase();

        for blocked in BLOCKED_POWERSHELL {
            if command.contains(blocked) {
                return Err(format!(
                    "PowerShell command contains blocked fragment '{blocked}'"
                ));
            }
        }
        Ok(())
    }

    fn check_app(&self, action: &ToolAction) -> Result<(), String> {
        let Some(allowed) = &self.allowed_apps else {
            return Ok(());
        };

        let mode = action
            .arguments
            .get("mode")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if mode != "launch" && mode != "switch" {
            // Resizing stays within whatever is already open.
            return Ok(());
        }

        let name = action
            .arguments
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if allowed.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            Ok(())
        } else {
            Err(format!("application '{name}' is not in the allow-list"))
        }
    }

    fn check_scrape(&self, action: &ToolAction) -> Result<(), String> {
        let url = action
            .arguments
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(format!("scrape URL must be http(s), got '{url}'"))
        }
    }
}
