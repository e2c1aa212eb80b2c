// plan.rs — The canonical plan shape submitted for review.
//
// Plans are built per request and discarded after the verdict. Unknown
// fields (e.g. a free-text `goal`) are ignored on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sentinel_policy::ToolArgs;

use crate::adapter::ToolInput;

/// An ordered set of tool invocations reviewed as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Opaque identifier, informational only.
    #[serde(default)]
    pub id: Option<String>,

    /// Submitting agent, for the audit trail.
    #[serde(default)]
    pub agent: Option<String>,

    /// Authority role. Absent → the reviewer's default (lowest-privilege) role.
    #[serde(default)]
    pub role: Option<String>,

    /// Evaluated in order; the first failing step decides the verdict.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            agent: Some(agent.into()),
            role: None,
            steps: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse a plan from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One tool invocation.
///
/// Deserialization never fails on a single bad step: a wrong-shaped step is
/// kept with a [`Step::defect`] so the reviewer can deny it by number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Value")]
pub struct Step {
    /// Capability being invoked. A missing tool makes the step malformed.
    pub tool: Option<String>,

    pub args: ToolArgs,

    #[serde(skip)]
    defect: Option<&'static str>,
}

impl Step {
    pub fn new(tool: impl Into<String>, args: ToolArgs) -> Self {
        Self {
            tool: Some(tool.into()),
            args,
            defect: None,
        }
    }

    /// Build a step from any JSON value; non-objects are wrapped as `{"input": ...}`.
    pub fn from_value(tool: impl Into<String>, args: Value) -> Self {
        Self::new(tool, ToolInput::from(args).into_args())
    }

    fn malformed(tool: Option<String>, defect: &'static str) -> Self {
        Self {
            tool,
            args: ToolArgs::new(),
            defect: Some(defect),
        }
    }

    /// The tool name, if present and non-blank.
    pub fn tool_name(&self) -> Option<&str> {
        self.tool.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Why the submitted step could not be read, if it could not.
    pub fn defect(&self) -> Option<&'static str> {
        self.defect
    }
}

impl From<Value> for Step {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            _ => return Self::malformed(None, "step must be an object"),
        };

        let tool = match fields.remove("tool") {
            None | Some(Value::Null) => None,
            Some(Value::String(tool)) => Some(tool),
            Some(_) => return Self::malformed(None, "tool must be a string"),
        };

        let args = match fields.remove("args") {
            None => ToolArgs::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Self::malformed(tool, "args must be an object"),
        };

        Self {
            tool,
            args,
            defect: None,
        }
    }
}
