//! Post-compaction "smart tail": a bounded directive + context snippet that
//! tells the resumed agent what it was doing.
//!
//! The agent reads text, so the header spells out the action it must take.
//! Sections are assembled in a fixed order and the budget is enforced on the
//! joined string only; when the budget is tight, trailing sections (the
//! transcript pointer first) are the ones that get cut.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{active_todos, classify_state, last_assistant_message, last_user_message, running_tools};
use crate::paths::transcript_path;
use crate::text::{estimate_tokens, take_chars, truncate_to_tokens};
use crate::types::{SessionState, SmartTailResult, TailClassification, Todo};

pub const DEFAULT_MAX_TOKENS: usize = 1200;

/// Max chars kept from the last user message.
const LAST_USER_CHARS: usize = 800;
/// Max chars kept from the last assistant message.
const LAST_ASSISTANT_CHARS: usize = 1600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartTailOptions {
    /// Directory where transcripts are stored; enables the pointer line.
    pub transcript_dir: Option<String>,
    /// Token budget for the injected content.
    pub max_tokens: usize,
}

impl Default for SmartTailOptions {
    fn default() -> Self {
        Self {
            transcript_dir: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl SmartTailOptions {
    pub fn transcript_dir(mut self, dir: impl Into<String>) -> Self {
        self.transcript_dir = Some(dir.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

struct TailHeader {
    title: &'static str,
    instruction: &'static str,
}

fn header_for(classification: TailClassification) -> Option<TailHeader> {
    match classification {
        TailClassification::CleanEnd => None,
        TailClassification::ActiveWork => Some(TailHeader {
            title: "COMPACTION INTERRUPTED ACTIVE WORK",
            instruction: "You were mid-task when compaction hit. Resume from where you left off. \
                          If you had findings ready, present them to the user NOW.",
        }),
        TailClassification::MidTool => Some(TailHeader {
            title: "COMPACTION INTERRUPTED MID-EXECUTION",
            instruction: "You were in the middle of executing tools when compaction hit. \
                          Review what was in flight and resume or re-run as needed.",
        }),
    }
}

fn format_todo(todo: &Todo) -> String {
    match &todo.priority {
        Some(priority) => format!("- [{} {}] {}", todo.status, priority, todo.content),
        None => format!("- [{}] {}", todo.status, todo.content),
    }
}

/// Classify `state` and build the tail to inject after compaction.
pub fn generate_smart_tail(state: &SessionState, opts: &SmartTailOptions) -> SmartTailResult {
    let classification = classify_state(state);
    let transcript_path = opts
        .transcript_dir
        .as_deref()
        .filter(|dir| !dir.is_empty())
        .map(|dir| transcript_path(dir, &state.session_id));

    let Some(header) = header_for(classification) else {
        debug!(session_id = %state.session_id, "Clean end, nothing to inject");
        return SmartTailResult {
            inject: false,
            content: String::new(),
            estimated_tokens: 0,
            classification,
            transcript_path,
        };
    };

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("### {}", header.title));
    lines.push(format!("**Action required:** {}", header.instruction));
    lines.push(String::new());

    if let Some(user) = last_user_message(&state.messages) {
        let condensed = take_chars(user.content.trim(), LAST_USER_CHARS);
        lines.push(format!("**Last user request:** {condensed}"));
        lines.push(String::new());
    }

    let last_assistant = last_assistant_message(&state.messages);
    if let Some(assistant) = last_assistant {
        let condensed = take_chars(assistant.content.trim(), LAST_ASSISTANT_CHARS);
        lines.push(format!("**Your prepared response (present this):** {condensed}"));
        lines.push(String::new());
    }

    let todos = active_todos(&state.todos);
    if !todos.is_empty() {
        lines.push("**Active todos:**".to_string());
        lines.extend(todos.into_iter().map(format_todo));
        lines.push(String::new());
    }

    if classification == TailClassification::MidTool {
        let in_flight = last_assistant.map(running_tools).unwrap_or_default();
        if !in_flight.is_empty() {
            let names: Vec<&str> = in_flight.iter().map(|t| t.name.as_str()).collect();
            lines.push(format!("**Tools in flight:** {}", names.join(", ")));
            lines.push(String::new());
        }
    }

    if let Some(path) = &transcript_path {
        lines.push(format!("**Full transcript:** {path}"));
        lines.push(String::new());
    }

    let joined = lines.join("\n");
    let content = truncate_to_tokens(&joined, opts.max_tokens);
    let estimated_tokens = estimate_tokens(&content);

    debug!(
        session_id = %state.session_id,
        classification = %classification,
        estimated_tokens,
        truncated = content.len() != joined.len(),
        "Generated smart tail"
    );

    SmartTailResult {
        inject: true,
        content,
        estimated_tokens,
        classification,
        transcript_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, TodoStatus, ToolCall};
    use proptest::prelude::*;

    fn active_state() -> SessionState {
        SessionState::new("ses_active")
            .with_messages(vec![
                Message::user("Implement auth, then add tests"),
                Message::assistant("Auth implemented. Moving to tests next."),
            ])
            .with_todos(vec![
                Todo::new("Implement auth", TodoStatus::Completed),
                Todo::new("Add tests", TodoStatus::Pending).with_priority("high"),
            ])
    }

    fn mid_tool_state() -> SessionState {
        SessionState::new("ses_midtool")
            .with_messages(vec![
                Message::user("Refactor the database layer"),
                Message::assistant("Refactoring in progress.").with_tools(vec![
                    ToolCall::completed("Read"),
                    ToolCall::running("Edit"),
                    ToolCall::running("Bash"),
                ]),
            ])
            .with_todos(vec![Todo::new("Refactor database", TodoStatus::InProgress)])
    }

    #[test]
    fn test_clean_end_injects_nothing() {
        let state = SessionState::new("ses_clean")
            .with_messages(vec![Message::user("Fix the bug"), Message::assistant("Done.")])
            .with_todos(vec![Todo::new("Fix the bug", TodoStatus::Completed)]);
        let result = generate_smart_tail(&state, &SmartTailOptions::default());

        assert_eq!(result.classification, TailClassification::CleanEnd);
        assert!(!result.inject);
        assert_eq!(result.content, "");
        assert_eq!(result.estimated_tokens, 0);
        assert_eq!(result.transcript_path, None);
    }

    #[test]
    fn test_clean_end_still_reports_transcript_path() {
        let state = SessionState::new("ses_clean");
        let opts = SmartTailOptions::default().transcript_dir("brain/transcripts");
        let result = generate_smart_tail(&state, &opts);

        assert!(!result.inject);
        assert_eq!(result.transcript_path.as_deref(), Some("brain/transcripts/ses_clean.md"));
    }

    #[test]
    fn test_active_work_sections() {
        let result = generate_smart_tail(&active_state(), &SmartTailOptions::default());

        assert_eq!(result.classification, TailClassification::ActiveWork);
        assert!(result.inject);
        assert!(result.content.starts_with("### COMPACTION INTERRUPTED ACTIVE WORK\n"));
        assert!(result.content.contains("**Action required:**"));
        assert!(result.content.contains("Resume from where you left off"));
        assert!(result.content.contains("**Last user request:** Implement auth, then add tests"));
        assert!(result.content.contains("**Your prepared response (present this):** Auth implemented"));
        assert!(result.content.contains("- [pending high] Add tests"));
        assert!(!result.content.contains("- [completed] Implement auth"));
        assert!(!result.content.contains("Tools in flight"));
        assert_eq!(result.estimated_tokens, estimate_tokens(&result.content));
    }

    #[test]
    fn test_mid_tool_sections() {
        let result = generate_smart_tail(&mid_tool_state(), &SmartTailOptions::default());

        assert_eq!(result.classification, TailClassification::MidTool);
        assert!(result.content.contains("COMPACTION INTERRUPTED MID-EXECUTION"));
        assert!(result.content.contains("Review what was in flight"));
        assert!(result.content.contains("**Tools in flight:** Edit, Bash"));
        assert!(result.content.contains("- [in_progress] Refactor database"));
    }

    #[test]
    fn test_single_running_tool_example() {
        let state = SessionState::new("s1")
            .with_todos(vec![Todo::new("X", TodoStatus::Pending)])
            .with_messages(vec![
                Message::user("hi"),
                Message::assistant("ok").with_tools(vec![ToolCall::running("Edit")]),
            ]);
        let result = generate_smart_tail(&state, &SmartTailOptions::default());

        assert_eq!(result.classification, TailClassification::MidTool);
        assert!(result.content.contains("Review what was in flight"));
        assert!(result.content.contains("Edit"));
        assert!(result.content.contains("- [pending] X"));
    }

    #[test]
    fn test_section_order() {
        let opts = SmartTailOptions::default().transcript_dir("t");
        let content = generate_smart_tail(&mid_tool_state(), &opts).content;

        let positions: Vec<usize> = [
            "### COMPACTION",
            "**Last user request:**",
            "**Your prepared response",
            "**Active todos:**",
            "**Tools in flight:**",
            "**Full transcript:** t/ses_midtool.md",
        ]
        .iter()
        .map(|needle| content.find(needle).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pointer_line_only_with_transcript_dir() {
        let state = SessionState::new("ses_ptr")
            .with_messages(vec![Message::user("Hello")])
            .with_todos(vec![Todo::new("Do something", TodoStatus::Pending)]);

        let with_dir = generate_smart_tail(&state, &SmartTailOptions::default().transcript_dir("brain/transcripts"));
        assert!(with_dir.content.contains("**Full transcript:** brain/transcripts/ses_ptr.md"));
        assert_eq!(with_dir.transcript_path.as_deref(), Some("brain/transcripts/ses_ptr.md"));

        let without = generate_smart_tail(&state, &SmartTailOptions::default());
        assert!(!without.content.contains("Full transcript:"));
        assert_eq!(without.transcript_path, None);
    }

    #[test]
    fn test_empty_transcript_dir_counts_as_absent() {
        let state = SessionState::new("s1").with_todos(vec![Todo::new("X", TodoStatus::Pending)]);
        let result = generate_smart_tail(&state, &SmartTailOptions::default().transcript_dir(""));

        assert!(result.inject);
        assert_eq!(result.transcript_path, None);
        assert!(!result.content.contains("Full transcript"));
    }

    #[test]
    fn test_missing_sources_are_omitted() {
        let state = SessionState::new("ses_bare").with_todos(vec![Todo::new("Work", TodoStatus::Pending)]);
        let result = generate_smart_tail(&state, &SmartTailOptions::default());

        assert!(!result.content.contains("Last user request"));
        assert!(!result.content.contains("prepared response"));
        assert!(result.content.contains("- [pending] Work"));
    }

    #[test]
    fn test_message_snippets_are_trimmed_and_capped() {
        let state = SessionState::new("ses_long")
            .with_messages(vec![
                Message::user(format!("   {}   ", "u".repeat(900))),
                Message::assistant("a".repeat(2000)),
            ])
            .with_todos(vec![Todo::new("Work", TodoStatus::Pending)]);
        let result = generate_smart_tail(&state, &SmartTailOptions::default().max_tokens(10_000));

        assert!(result.content.contains(&format!("**Last user request:** {}\n", "u".repeat(800))));
        assert!(!result.content.contains(&"u".repeat(801)));
        assert!(result.content.contains(&"a".repeat(1600)));
        assert!(!result.content.contains(&"a".repeat(1601)));
    }

    #[test]
    fn test_tight_budget_drops_trailing_pointer() {
        let state = SessionState::new("ses_tight")
            .with_messages(vec![Message::user("x".repeat(800))])
            .with_todos(vec![Todo::new("Work", TodoStatus::Pending)]);
        let opts = SmartTailOptions::default().transcript_dir("transcripts").max_tokens(100);
        let result = generate_smart_tail(&state, &opts);

        assert!(result.inject);
        assert_eq!(result.content.chars().count(), 400);
        assert!(result.content.ends_with("..."));
        assert!(result.content.starts_with("### COMPACTION INTERRUPTED ACTIVE WORK"));
        assert!(!result.content.contains("Full transcript"));
        assert!(!result.content.contains("Active todos"));
        assert_eq!(result.estimated_tokens, 100);
        // the path is still reported even though the pointer line was cut
        assert_eq!(result.transcript_path.as_deref(), Some("transcripts/ses_tight.md"));
    }

    #[test]
    fn test_zero_budget_yields_empty_content() {
        let opts = SmartTailOptions::default().max_tokens(0);
        let result = generate_smart_tail(&active_state(), &opts);
        assert!(result.inject);
        assert_eq!(result.content, "");
        assert_eq!(result.estimated_tokens, 0);
    }

    #[test]
    fn test_default_budget_fits_small_state() {
        let result = generate_smart_tail(&active_state(), &SmartTailOptions::default());
        assert!(result.estimated_tokens <= DEFAULT_MAX_TOKENS);
        assert!(!result.content.ends_with("..."));
    }

    proptest! {
        #[test]
        fn estimated_tokens_never_exceed_budget(
            user in ".{0,2000}",
            assistant in ".{0,3000}",
            todo_count in 1usize..60,
            max_tokens in 0usize..1500,
        ) {
            let todos = (0..todo_count)
                .map(|i| Todo::new(format!("todo number {i} with some words"), TodoStatus::Pending))
                .collect();
            let state = SessionState::new("ses_prop")
                .with_messages(vec![
                    Message::user(user),
                    Message::assistant(assistant).with_tools(vec![ToolCall::running("Bash")]),
                ])
                .with_todos(todos);
            let opts = SmartTailOptions::default().transcript_dir("dir").max_tokens(max_tokens);
            let result = generate_smart_tail(&state, &opts);

            prop_assert!(result.inject);
            prop_assert!(result.estimated_tokens <= max_tokens);
            prop_assert_eq!(result.estimated_tokens, estimate_tokens(&result.content));
        }
    }
}
