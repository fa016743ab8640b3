//! Collision-resistant identifiers for threads, runs, messages and tool calls.

use uuid::Uuid;

fn prefixed(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Generate a new thread ID.
pub fn thread_id() -> String {
    prefixed("thread")
}

/// Generate a new run ID.
pub fn run_id() -> String {
    prefixed("run")
}

/// Generate a new message ID.
pub fn message_id() -> String {
    prefixed("msg")
}

/// Generate a new tool call ID.
pub fn tool_call_id() -> String {
    prefixed("tool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_carry_prefix_and_are_unique() {
        let a = tool_call_id();
        let b = tool_call_id();
        assert!(a.starts_with("tool-"));
        assert_ne!(a, b);
        assert!(thread_id().starts_with("thread-"));
        assert!(run_id().starts_with("run-"));
        assert!(message_id().starts_with("msg-"));
    }
}
