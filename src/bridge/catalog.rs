//! Built-in Windows-MCP tool catalog.
//!
//! Used when the remote deployment does not expose a discovery endpoint. The
//! schemas here mirror the tool set of a stock Windows-MCP server running in
//! streamable-http mode; deployments that diverge should serve `GET /tools`
//! instead, which always takes precedence.

use serde_json::json;

use super::ToolSpec;

fn spec(name: &str, description: &str, parameters: serde_json::Value) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// The default tool registry for a Windows-MCP server.
pub fn builtin_catalog() -> Vec<ToolSpec> {
    vec![
        spec(
            "State-Tool",
            "Capture the current desktop state (optionally with screenshot).",
            json!({
                "type": "object",
                "properties": {
                    "use_vision": {
                        "type": "boolean",
                        "description": "Return a screenshot in addition to UI tree and metadata."
                    }
                }
            }),
        ),
        spec(
            "App-Tool",
            "Launch, resize, or switch between Windows applications.",
            json!({
                "type": "object",
                "properties": {
                    "mode": {
                        "type": "string",
                        "enum": ["launch", "resize", "switch"],
                        "description": "Type of application control to perform."
                    },
                    "name": {
                        "type": "string",
                        "description": "Application name when launching or switching."
                    },
                    "window_loc": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Top-left window coordinate [x, y] when resizing."
                    },
                    "window_size": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Window size [width, height] when resizing."
                    }
                }
            }),
        ),
        spec(
            "Click-Tool",
            "Click on UI elements at given coordinates.",
            json!({
                "type": "object",
                "properties": {
                    "loc": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Pixel coordinates [x, y] to click."
                    },
                    "button": {
                        "type": "string",
                        "enum": ["left", "right", "middle"],
                        "description": "Mouse button to use."
                    },
                    "clicks": {
                        "type": "integer",
                        "description": "Number of clicks (1-3)."
                    }
                }
            }),
        ),
        spec(
            "Move-Tool",
            "Move the mouse pointer without clicking.",
            json!({
                "type": "object",
                "properties": {
                    "to_loc": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Destination coordinates [x, y]."
                    }
                }
            }),
        ),
        spec(
            "Drag-Tool",
            "Drag from the current cursor position to a destination.",
            json!({
                "type": "object",
                "properties": {
                    "to_loc": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Destination coordinates [x, y]."
                    }
                }
            }),
        ),
        spec(
            "Type-Tool",
            "Type text into a focused field or a coordinate.",
            json!({
                "type": "object",
                "properties": {
                    "loc": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Optional coordinates [x, y] to click before typing."
                    },
                    "text": {"type": "string", "description": "Text to type."},
                    "clear": {
                        "type": "boolean",
                        "description": "Clear existing text before typing."
                    },
                    "press_enter": {
                        "type": "boolean",
                        "description": "Press Enter after typing."
                    }
                }
            }),
        ),
        spec(
            "Shortcut-Tool",
            "Trigger keyboard shortcuts like ctrl+c or alt+tab.",
            json!({
                "type": "object",
                "properties": {
                    "shortcut": {
                        "type": "string",
                        "description": "Shortcut string, e.g., 'ctrl+c' or 'win+r'."
                    }
                }
            }),
        ),
        spec(
            "Scroll-Tool",
            "Scroll vertically or horizontally.",
            json!({
                "type": "object",
                "properties": {
                    "loc": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Optional coordinates [x, y] to scroll at."
                    },
                    "type": {
                        "type": "string",
                        "enum": ["horizontal", "vertical"],
                        "description": "Scroll orientation."
                    },
                    "direction": {
                        "type": "string",
                        "enum": ["up", "down", "left", "right"],
                        "description": "Scroll direction."
                    },
                    "wheel_times": {
                        "type": "integer",
                        "description": "Wheel steps to scroll (roughly 3-5 lines per step)."
                    }
                }
            }),
        ),
        spec(
            "Wait-Tool",
            "Pause execution for a few seconds.",
            json!({
                "type": "object",
                "properties": {
                    "duration": {
                        "type": "integer",
                        "description": "Duration in seconds to wait."
                    }
                }
            }),
        ),
        spec(
            "Powershell-Tool",
            "Execute a PowerShell command and return output.",
            json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "PowerShell command to run."
                    }
                }
            }),
        ),
        spec(
            "Scrape-Tool",
            "Scrape webpage content to markdown via the MCP server.",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Full URL including protocol to scrape."
                    }
                }
            }),
        ),
    ]
}
