//! Rule-based session state classification (no LLM calls).
//!
//! - clean-end: no pending/in-progress todos
//! - mid-tool: active todos and the last assistant turn has a running tool
//! - active-work: active todos otherwise
//!
//! "Last" always means last in sequence order; timestamps are ignored.

use crate::types::{Message, Role, SessionState, TailClassification, Todo, ToolCall};

/// Todos that are pending or in progress, in their original order.
pub fn active_todos(todos: &[Todo]) -> Vec<&Todo> {
    todos.iter().filter(|t| t.status.is_active()).collect()
}

fn last_with_role(messages: &[Message], role: Role) -> Option<&Message> {
    messages.iter().rev().find(|m| m.role == role)
}

pub fn last_user_message(messages: &[Message]) -> Option<&Message> {
    last_with_role(messages, Role::User)
}

pub fn last_assistant_message(messages: &[Message]) -> Option<&Message> {
    last_with_role(messages, Role::Assistant)
}

/// Tool calls on `msg` whose status is `running`.
pub fn running_tools(msg: &Message) -> Vec<&ToolCall> {
    msg.tools.iter().filter(|t| t.is_running()).collect()
}

/// Classify a session snapshot. Total: every state maps to exactly one variant.
pub fn classify_state(state: &SessionState) -> TailClassification {
    if !state.todos.iter().any(|t| t.status.is_active()) {
        return TailClassification::CleanEnd;
    }

    let in_flight = last_assistant_message(&state.messages)
        .map(|m| m.tools.iter().any(ToolCall::is_running))
        .unwrap_or(false);

    if in_flight {
        TailClassification::MidTool
    } else {
        TailClassification::ActiveWork
    }
}
