//! Dialogue transcript types and the fixed oracle instructions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const SAVE_RESERVATION_TOOL: &str = "save_reservation";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One transcript entry. The first turn of every session is the fixed
/// system instruction and is never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A structured instruction from the oracle naming a tool and its
/// JSON-encoded arguments. Receiving one for `save_reservation` signals
/// that slot collection is complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: String,
}

/// The oracle's answer for one turn: either a plain utterance, or a tool
/// invocation with optional accompanying text. The orchestrator dispatches
/// on the variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OracleReply {
    Text(String),
    ToolCall { content: Option<String>, call: ToolCall },
}

impl OracleReply {
    /// Assistant-visible text of the reply, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text(content) => Some(content.as_str()),
            Self::ToolCall { content, .. } => content.as_deref(),
        }
    }
}

/// System instruction seeding every session transcript. The service window
/// and contact-format rules live here, enforced conversationally by the
/// oracle rather than by the validator.
pub fn system_prompt() -> &'static str {
    "You are a restaurant booking assistant. \
     Collect: date (YYYY-MM-DD), time (HH:MM), guests (number), name, and contact (phone/email). \
     Ask for one piece at a time. \
     Do not invent values for any piece of information. If you don't understand the values \
     provided by the user for date or time, keep asking for them. \
     The service will be available from 19:00 to 21:59, so any time out of that range, please \
     notify the user politely. \
     Do the same with the contact information. It should be a valid email or a valid 10-digits \
     phone number. \
     Once every piece has been collected, call the save_reservation tool with all of them. \
     Do not engage in conversation outside this domain."
}

/// Tool schema declared to the oracle on every request.
pub fn reservation_tools() -> Value {
    json!([
        {
            "type": "function",
            "function": {
                "name": SAVE_RESERVATION_TOOL,
                "description": "Save restaurant reservation details.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "date": { "type": "string", "description": "YYYY-MM-DD" },
                        "time": { "type": "string", "description": "HH:MM in 24-hour format" },
                        "guests": { "type": "number", "description": "Number of guests" },
                        "name": { "type": "string", "description": "Customer full name" },
                        "contact": { "type": "string", "description": "Email or phone" }
                    },
                    "required": ["date", "time", "guests", "name", "contact"]
                }
            }
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::{reservation_tools, OracleReply, Role, ToolCall, Turn, SAVE_RESERVATION_TOOL};

    #[test]
    fn turns_serialize_with_lowercase_roles() {
        let serialized = serde_json::to_value(Turn::user("hi")).expect("serializable");
        assert_eq!(serialized["role"], "user");
        assert_eq!(serialized["content"], "hi");
    }

    #[test]
    fn turn_constructors_tag_roles() {
        assert_eq!(Turn::system("s").role, Role::System);
        assert_eq!(Turn::assistant("a").role, Role::Assistant);
    }

    #[test]
    fn tool_schema_declares_all_required_slots() {
        let tools = reservation_tools();
        let function = &tools[0]["function"];
        assert_eq!(function["name"], SAVE_RESERVATION_TOOL);
        let required = function["parameters"]["required"].as_array().expect("required array");
        assert_eq!(required.len(), 5);
    }

    #[test]
    fn reply_content_is_surfaced_for_both_variants() {
        assert_eq!(OracleReply::Text("hello".into()).content(), Some("hello"));
        let with_call = OracleReply::ToolCall {
            content: None,
            call: ToolCall { name: SAVE_RESERVATION_TOOL.into(), arguments: "{}".into() },
        };
        assert_eq!(with_call.content(), None);
    }
}
