//! Line-oriented transport: one message per input line, replies as text.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::bot::{BotHandler, ChatMessage};
use crate::config::Credentials;
use crate::error::Result;

/// Console stand-in for a chat platform connection.
pub struct ConsoleTransport {
    credentials: Credentials,
    handler: BotHandler,
}

impl ConsoleTransport {
    pub fn new(credentials: Credentials, handler: BotHandler) -> Self {
        Self {
            credentials,
            handler,
        }
    }

    /// Short, non-secret identifier for the session.
    pub fn session_label(&self) -> String {
        let token = self.credentials.token();
        let tail: String = token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("console (token …{tail})")
    }

    /// Serve until `input` is exhausted. Returns the number of replies sent.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        log::info!(
            "Logged in as {}, listening for \"{}\"",
            self.session_label(),
            self.handler.presence()
        );

        let mut lines = input.lines();
        let mut sent = 0;
        while let Some(line) = lines.next_line().await? {
            let message = ChatMessage::from_user(line);
            if let Some(reply) = self.handler.handle(&message).await {
                output.write_all(reply.to_string().as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
                sent += 1;
            }
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::{BackerRecord, BotConfig};
    use crate::services::QueryResolver;
    use crate::storage::{LocalSnapshotStore, SnapshotStore};
    use tempfile::TempDir;

    async fn transport(tmp: &TempDir) -> ConsoleTransport {
        let store = LocalSnapshotStore::new(tmp.path().join("backers.json"));
        store
            .write(&[
                BackerRecord::new("Carol", "", "5 days ago").with_place(1),
                BackerRecord::new("Alice", "", "1 day ago").with_place(2),
            ])
            .await
            .unwrap();
        let handler =
            BotHandler::new(QueryResolver::new(Arc::new(store)), BotConfig::default()).unwrap();
        ConsoleTransport::new(Credentials::new("abcdef123456").unwrap(), handler)
    }

    #[tokio::test]
    async fn test_replies_only_to_commands() {
        let tmp = TempDir::new().unwrap();
        let input: &[u8] = b"hello\n!focus Alice\n!focus Zed\n";
        let mut output = Vec::new();

        let sent = transport(&tmp).await.run(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(sent, 2);
        assert!(text.contains("== Alice ==\nYour place in line"));
        assert!(text.contains("Current place in line: 2"));
        assert!(text.contains("== Zed ==\nNo such user found"));
    }

    #[tokio::test]
    async fn test_session_label_hides_token() {
        let tmp = TempDir::new().unwrap();
        let label = transport(&tmp).await.session_label();
        assert!(label.ends_with("…3456)"));
        assert!(!label.contains("abcdef"));
    }
}
