// extraction.rs — Resource extraction from tool arguments.
//
// Tool arguments are free-form JSON objects whose keys vary per agent
// framework. A fixed, tool-keyed table decides which tools carry a
// resource and which argument keys may hold it, in priority order.

use serde_json::{Map, Value};

/// Tool arguments as received in a plan step.
pub type ToolArgs = Map<String, Value>;

/// Tools whose arguments name a resource (file path, command line, URL).
const RESOURCE_TOOLS: &[&str] = &[
    "read_file",
    "view_file",
    "write_to_file",
    "run_command",
    "read_url_content",
];

/// Argument keys tried in order: path-like, then command-like, then URL-like.
const RESOURCE_KEYS: &[&str] = &[
    "path",
    "AbsolutePath",
    "TargetFile",
    "command",
    "CommandLine",
    "Url",
];

/// Tools checked against the sensitive-file blacklist.
const PATH_TOOLS: &[&str] = &["read_file", "view_file", "read_url_content"];

/// Tools checked against the prohibited-command blacklist.
const COMMAND_TOOLS: &[&str] = &["run_command"];

const COMMAND_KEYS: &[&str] = &["command", "CommandLine"];

/// Extract the resource a tool call touches, if the tool has one.
///
/// Returns `None` for tools outside the table and for calls where no known
/// key holds a non-empty value.
pub fn extract_resource(tool: &str, args: &ToolArgs) -> Option<String> {
    if !RESOURCE_TOOLS.contains(&tool) {
        return None;
    }
    first_present(args, RESOURCE_KEYS)
}

/// Extract the command line from a command-execution call.
pub fn extract_command(args: &ToolArgs) -> Option<String> {
    first_present(args, COMMAND_KEYS)
}

/// Whether `tool` belongs to the read/view/URL-fetch family.
pub fn is_path_tool(tool: &str) -> bool {
    PATH_TOOLS.contains(&tool)
}

/// Whether `tool` executes shell commands.
pub fn is_command_tool(tool: &str) -> bool {
    COMMAND_TOOLS.contains(&tool)
}

fn first_present(args: &ToolArgs, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| args.get(*key).and_then(resource_text))
}

/// A string value, or an argv-style array of strings joined by spaces.
fn resource_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            let joined = parts?.join(" ");
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}
