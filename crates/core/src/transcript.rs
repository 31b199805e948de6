//! Condensed markdown transcript of a session.
//!
//! Captures the conversational flow (who said what, which tools ran) without
//! the full tool output that bloats context. System messages are dropped.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::text::truncate_with_ellipsis;
use crate::types::{Message, Role, ToolCall, ToolStatus};

pub const DEFAULT_MAX_USER_CHARS: usize = 500;
pub const DEFAULT_MAX_ASSISTANT_CHARS: usize = 1000;

/// Options for customizing the transcript format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptOptions {
    /// List tool names under assistant messages
    pub include_tools: bool,
    /// Annotate assistant headings with agent/model
    pub include_metadata: bool,
    /// Max characters per user message
    pub max_user_chars: usize,
    /// Max characters per assistant message
    pub max_assistant_chars: usize,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            include_tools: true,
            include_metadata: true,
            max_user_chars: DEFAULT_MAX_USER_CHARS,
            max_assistant_chars: DEFAULT_MAX_ASSISTANT_CHARS,
        }
    }
}

impl TranscriptOptions {
    pub fn include_tools(mut self, include: bool) -> Self {
        self.include_tools = include;
        self
    }

    pub fn include_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    pub fn max_user_chars(mut self, max: usize) -> Self {
        self.max_user_chars = max;
        self
    }

    pub fn max_assistant_chars(mut self, max: usize) -> Self {
        self.max_assistant_chars = max;
        self
    }
}

/// `HH:MM` (24h) in the local time zone. `None` if the timestamp is out of range.
fn format_time(timestamp_ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
}

fn format_tool_calls(tools: &[ToolCall]) -> String {
    let names: Vec<String> = tools
        .iter()
        .map(|t| match t.status {
            Some(ToolStatus::Error) => format!("{} (error)", t.name),
            _ => t.name.clone(),
        })
        .collect();
    format!("> Tools: {}", names.join(", "))
}

fn assistant_meta(msg: &Message, opts: &TranscriptOptions) -> String {
    if !opts.include_metadata {
        return String::new();
    }
    match (&msg.agent, &msg.model) {
        (Some(agent), Some(model)) => format!(" ({agent} · {model})"),
        (Some(agent), None) => format!(" ({agent})"),
        _ => String::new(),
    }
}

/// Format messages into a condensed markdown transcript.
pub fn format_transcript(session_id: &str, messages: &[Message], opts: &TranscriptOptions) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Session Transcript".to_string());
    lines.push(String::new());
    lines.push(format!("**Session:** {session_id}"));
    lines.push(format!("**Messages:** {}", messages.len()));

    let first = messages.first().and_then(|m| m.timestamp).and_then(format_time);
    let last = messages.last().and_then(|m| m.timestamp).and_then(format_time);
    if let (Some(first), Some(last)) = (first, last) {
        lines.push(format!("**Time:** {first} → {last}"));
    }
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    for msg in messages {
        let time = msg
            .timestamp
            .and_then(format_time)
            .map(|t| format!("[{t}] "))
            .unwrap_or_default();

        match msg.role {
            Role::System => continue,
            Role::User => {
                lines.push(format!("### {time}User"));
                lines.push(String::new());
                lines.push(truncate_with_ellipsis(msg.content.trim(), opts.max_user_chars));
            }
            Role::Assistant => {
                lines.push(format!("### {time}Assistant{}", assistant_meta(msg, opts)));
                lines.push(String::new());
                lines.push(truncate_with_ellipsis(msg.content.trim(), opts.max_assistant_chars));

                if opts.include_tools && !msg.tools.is_empty() {
                    lines.push(String::new());
                    lines.push(format_tool_calls(&msg.tools));
                }
            }
        }

        lines.push(String::new());
    }

    lines.join("\n")
}
