// adapter.rs — Turning framework tool calls into plans.
//
// Agent frameworks describe a pending call as (tool name, tool input) where
// the input is either free text or a structured argument map. Anything that
// can report those two things implements `ToolAction` and can be reviewed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sentinel_policy::ToolArgs;

use crate::plan::{Plan, Step};

/// Plan id assigned to normalized single actions.
pub const ACTION_PLAN_ID: &str = "langchain_action";

/// Agent name assigned to normalized single actions.
pub const ACTION_AGENT: &str = "LangChainAgent";

/// Key under which free-text input is stored.
pub const TEXT_INPUT_KEY: &str = "input";

/// The two shapes a tool input can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    Text(String),
    Structured(ToolArgs),
}

impl ToolInput {
    /// Argument map for a [`Step`]. Text becomes `{"input": text}`.
    pub fn into_args(self) -> ToolArgs {
        match self {
            ToolInput::Structured(args) => args,
            ToolInput::Text(text) => {
                let mut args = ToolArgs::new();
                args.insert(TEXT_INPUT_KEY.to_string(), Value::String(text));
                args
            }
        }
    }
}

impl From<Value> for ToolInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(args) => ToolInput::Structured(args),
            Value::String(text) => ToolInput::Text(text),
            other => ToolInput::Text(other.to_string()),
        }
    }
}

impl From<String> for ToolInput {
    fn from(text: String) -> Self {
        ToolInput::Text(text)
    }
}

impl From<&str> for ToolInput {
    fn from(text: &str) -> Self {
        ToolInput::Text(text.to_string())
    }
}

impl From<ToolArgs> for ToolInput {
    fn from(args: ToolArgs) -> Self {
        ToolInput::Structured(args)
    }
}

/// A pending tool call from an agent framework.
pub trait ToolAction {
    fn tool_name(&self) -> &str;

    fn tool_input(&self) -> ToolInput;

    /// Role the caller asserts for this action, if any.
    fn role(&self) -> Option<&str> {
        None
    }
}

/// A framework-neutral action record, deserializable from
/// `{"tool": ..., "tool_input": ..., "log": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentAction {
    pub tool: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub log: String,
}

impl AgentAction {
    pub fn new(tool: impl Into<String>, tool_input: impl Into<Value>) -> Self {
        Self {
            tool: tool.into(),
            tool_input: tool_input.into(),
            log: String::new(),
        }
    }
}

impl ToolAction for AgentAction {
    fn tool_name(&self) -> &str {
        &self.tool
    }

    fn tool_input(&self) -> ToolInput {
        ToolInput::from(self.tool_input.clone())
    }
}

/// Build a one-step plan from a single action.
///
/// The role is the action's own role when it carries one, else `default_role`.
pub fn normalize_action<A: ToolAction + ?Sized>(action: &A, default_role: &str) -> Plan {
    let role = action.role().unwrap_or(default_role);
    Plan::new(ACTION_PLAN_ID, ACTION_AGENT)
        .with_role(role)
        .with_step(Step::new(action.tool_name(), action.tool_input().into_args()))
}
