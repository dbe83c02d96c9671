//! Outbound command queue.

use foxrdp_protocol::ActorMessage;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Cloneable handle for queueing commands to the debugger server.
///
/// Enqueueing never blocks; the connection's writer drains the queue and
/// flushes one frame per command. Commands are fire-and-forget: replies, if
/// any, arrive later as ordinary inbound messages.
#[derive(Clone, Debug)]
pub struct Outbox {
	tx: mpsc::UnboundedSender<ActorMessage>,
}

impl Outbox {
	/// Creates an outbox and the receiver its commands are delivered to.
	pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActorMessage>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, rx)
	}

	/// Queues `message` for sending.
	///
	/// # Errors
	///
	/// [`Error::ChannelClosed`] once the writer has stopped.
	pub fn send(&self, message: ActorMessage) -> Result<()> {
		tracing::debug!(to = %message.to, kind = %message.kind, "Queueing command");
		self.tx.send(message).map_err(|_| Error::ChannelClosed)
	}
}
