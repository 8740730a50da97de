//! Line-oriented command gateway
//!
//! Reads one command per line, dispatches it as the configured console
//! actor and writes the reply. Stops on EOF, `quit`/`exit`, or cancellation.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::dispatcher::{Command, CommandDispatcher, Invocation};
use crate::domain::auth::Actor;

pub struct ConsoleGateway {
    dispatcher: Arc<CommandDispatcher>,
    actor: Actor,
}

impl ConsoleGateway {
    pub fn new(dispatcher: Arc<CommandDispatcher>, actor: Actor) -> Self {
        Self { dispatcher, actor }
    }

    /// Serve commands until input ends. Returns the number of commands run.
    pub async fn run<R, W>(&self, input: R, mut output: W, shutdown: CancellationToken) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut handled = 0;

        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                debug!("Console input closed");
                break;
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if matches!(trimmed, "quit" | "exit") {
                info!("👋 Console session ended by operator");
                break;
            }

            let text = match Command::parse(trimmed) {
                Ok(command) => {
                    handled += 1;
                    let reply = self.dispatcher.handle(Invocation::new(self.actor, command)).await;
                    if reply.ephemeral {
                        format!("(only you can see this)\n{reply}")
                    } else {
                        reply.to_string()
                    }
                }
                Err(e) => format!("{e}\n"),
            };

            output.write_all(text.as_bytes()).await?;
            output.flush().await?;
        }

        Ok(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shared_state::SnapshotStore;
    use crate::domain::auth::AuthPolicy;
    use crate::domain::catalog::fixtures::{document, entry};
    use crate::domain::catalog::CatalogDocument;
    use crate::domain::errors::ShopError;
    use crate::domain::services::CatalogSource;
    use async_trait::async_trait;
    use tokio::io::BufReader;

    struct StaticSource;

    #[async_trait]
    impl CatalogSource for StaticSource {
        async fn fetch(&self) -> Result<CatalogDocument, ShopError> {
            Ok(document(vec![entry("Reaper", 1500, 1500), entry("Peely", 800, 1600)]))
        }
    }

    fn gateway(actor: Actor) -> ConsoleGateway {
        let dispatcher = CommandDispatcher::new(Arc::new(StaticSource), SnapshotStore::new(), AuthPolicy::new(1), 10);
        ConsoleGateway::new(Arc::new(dispatcher), actor)
    }

    async fn session(actor: Actor, script: &str) -> (usize, String) {
        let mut output = Vec::new();
        let handled = gateway(actor)
            .run(BufReader::new(script.as_bytes()), &mut output, CancellationToken::new())
            .await
            .unwrap();
        (handled, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_commands_until_eof() {
        let (handled, output) = session(Actor::member(2), "/deals\n\n/nope\n/cheap\n").await;

        assert_eq!(handled, 2);
        assert!(output.contains("Peely"));
        assert!(output.contains("Unknown command 'nope'"));
        assert!(output.contains("Cheapest Items"));
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let (handled, output) = session(Actor::administrator(2), "/setshopchannel 77\nquit\n/shop\n").await;

        assert_eq!(handled, 1);
        assert_eq!(output, "Item shop updates will be sent to <#77>\n");
    }

    #[tokio::test]
    async fn test_ephemeral_replies_are_marked() {
        let (_, output) = session(Actor::member(2), "/help\n").await;
        assert!(output.starts_with("(only you can see this)"));
    }

    #[tokio::test]
    async fn test_cancelled_gateway_returns() {
        let token = CancellationToken::new();
        token.cancel();
        let (_client, server) = tokio::io::duplex(64);
        let handled = gateway(Actor::member(2))
            .run(BufReader::new(server), Vec::new(), token)
            .await
            .unwrap();
        assert_eq!(handled, 0);
    }
}
