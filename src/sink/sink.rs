use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use crate::message::Message;
use super::Args;
use super::discord::DiscordClient;

/// Opaque identifier of a delivered message, used to edit it later.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MessageId(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &Message) -> Result<MessageId>;

    async fn edit(&self, id: &MessageId, message: &Message) -> Result<()>;
}

pub enum Sink {
    Discord(DiscordClient),
    Stdout(AtomicU64),
}

impl Sink {
    /// Check the destination is reachable before anything is monitored.
    pub async fn verify(&self) -> Result<()> {
        match self {
            Self::Discord(c) => c.verify().await,
            Self::Stdout(_)  => Ok(()),
        }
    }
}

#[async_trait]
impl Notifier for Sink {
    async fn send(&self, message: &Message) -> Result<MessageId> {
        match self {
            Self::Discord(c) => c.send(message).await,
            Self::Stdout(n)  => {
                println!("{}", serde_json::to_string(message)?);
                Ok(MessageId(n.fetch_add(1, Ordering::Relaxed).to_string()))
            }
        }
    }

    async fn edit(&self, id: &MessageId, message: &Message) -> Result<()> {
        match self {
            Self::Discord(c) => c.edit(id, message).await,
            Self::Stdout(_)  => {
                println!("{} {}", id, serde_json::to_string(message)?);
                Ok(())
            }
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::Stdout(AtomicU64::new(1))
    }
}

impl FromStr for Sink {
   type Err = Error;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let (kind, args) = Args::parse(arg)?;
        match kind.as_str() {
            "discord" => discord(args),
            "stdout"  => Ok(Self::default()),
            _         => Err(anyhow!("invalid sink: {}", arg)),
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn discord(args: Args) -> Result<Sink> {
    Ok(Sink::Discord(DiscordClient::new(args)?))
}
