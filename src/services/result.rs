use crate::error::{ClgError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Write-only sink for finalized outputs.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, output: String) -> Result<()>;
}

pub type ResultReceiver = mpsc::UnboundedReceiver<String>;

/// A [`ResultSink`] backed by an unbounded tokio channel.
#[derive(Clone)]
pub struct ChannelResultSink {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelResultSink {
    pub fn new() -> (Self, ResultReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ResultSink for ChannelResultSink {
    async fn deliver(&self, output: String) -> Result<()> {
        self.sender
            .send(output)
            .map_err(|_| ClgError::ResultChannel("receiver closed".to_string()))
    }
}
