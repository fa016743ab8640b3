//! A stand-in runner that echoes the user turn back.

use agui_core::runner::RunnerStream;
use agui_core::{AgentRunner, RunnerError, RunnerOutput};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// Replies with the user's own words, one word per chunk.
#[derive(Debug, Clone, Default)]
pub struct EchoRunner;

impl EchoRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentRunner for EchoRunner {
    async fn run(
        &self,
        _user_id: &str,
        session_id: &str,
        content: &str,
    ) -> Result<RunnerStream, RunnerError> {
        tracing::debug!(%session_id, chars = content.len(), "echoing user turn");

        let reply = format!("You said: {}", content);
        let mut outputs: Vec<Result<RunnerOutput, RunnerError>> = reply
            .split_inclusive(char::is_whitespace)
            .map(|word| Ok(RunnerOutput::text(word)))
            .collect();
        outputs.push(Ok(RunnerOutput::final_marker()));

        Ok(stream::iter(outputs).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_chunks_words_then_finishes() {
        let stream = EchoRunner::new().run("u", "s", "hello world").await.unwrap();
        let outputs: Vec<RunnerOutput> = stream.map(|item| item.unwrap()).collect().await;

        let text: String = outputs
            .iter()
            .flat_map(|o| o.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "You said: hello world");
        assert_eq!(outputs.len(), 5);
        assert!(outputs.last().unwrap().is_final);
        assert!(outputs[..4].iter().all(|o| !o.is_final));
    }
}
