use crate::core::signal::Signal;
use crate::error::{ClgError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Fire-and-forget publication of signals. A successful publish says nothing
/// about when, or whether, the signal is consumed.
#[async_trait]
pub trait SignalQueue: Send + Sync {
    async fn publish(&self, signal: Signal) -> Result<()>;
}

pub type SignalReceiver = mpsc::UnboundedReceiver<Signal>;

/// A [`SignalQueue`] backed by an unbounded tokio channel. Delivery is
/// at-most-once: a signal is lost if the receiver is dropped.
#[derive(Clone)]
pub struct ChannelSignalQueue {
    sender: mpsc::UnboundedSender<Signal>,
}

impl ChannelSignalQueue {
    pub fn new() -> (Self, SignalReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl SignalQueue for ChannelSignalQueue {
    async fn publish(&self, signal: Signal) -> Result<()> {
        let id = signal.id().to_string();
        self.sender
            .send(signal)
            .map_err(|_| ClgError::Queue(format!("signal {} dropped: receiver closed", id)))?;
        log::debug!("Published signal {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ControlContext;

    #[tokio::test]
    async fn test_publish_reaches_receiver() {
        let (queue, mut receiver) = ChannelSignalQueue::new();
        let signal = Signal::new(ControlContext::new().with_destination_id("n1"), vec![]).unwrap();
        queue.publish(signal.clone()).await.unwrap();

        assert_eq!(receiver.recv().await, Some(signal));
    }

    #[tokio::test]
    async fn test_publish_fails_when_receiver_is_gone() {
        let (queue, receiver) = ChannelSignalQueue::new();
        drop(receiver);
        let signal = Signal::new(ControlContext::new().with_destination_id("n1"), vec![]).unwrap();

        assert!(matches!(queue.publish(signal).await, Err(ClgError::Queue(_))));
    }
}
