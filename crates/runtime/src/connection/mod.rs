//! Connection layer: the dispatch loop and outbound writer.
//!
//! A [`Connection`] owns the actor registry and the outbound queue. Its
//! [`run`](Connection::run) method drives both directions of a framed
//! transport:
//!
//! 1. The reader receives one frame at a time and routes it by `from` id
//! 2. Handlers run synchronously on the loop and queue follow-up commands
//! 3. The writer drains the queue, flushing one frame per command
//!
//! Handler invocation is strictly serialized, so actor state is only ever
//! mutated from the loop. The loop returns `Ok(())` once
//! [`shutdown`](Connection::shutdown) has been requested, and returns the
//! error for any transport failure that happens otherwise.


mod outbox;
mod registry;

pub use outbox::Outbox;
pub use registry::{ActorRegistry, MessageHandler};

use foxrdp_protocol::ActorMessage;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::transport::{FrameReader, FrameWriter};

/// A single debugger connection.
pub struct Connection<H: MessageHandler> {
	registry: ActorRegistry<H>,
	outbox: Outbox,
	/// Taken by the first call to `run()`
	outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<ActorMessage>>>,
	shutdown: CancellationToken,
}

impl<H: MessageHandler> Default for Connection<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H: MessageHandler> Connection<H> {
	pub fn new() -> Self {
		let (outbox, outbound_rx) = Outbox::channel();
		Self {
			registry: ActorRegistry::new(),
			outbox,
			outbound_rx: Mutex::new(Some(outbound_rx)),
			shutdown: CancellationToken::new(),
		}
	}

	pub fn registry(&self) -> &ActorRegistry<H> {
		&self.registry
	}

	pub fn outbox(&self) -> &Outbox {
		&self.outbox
	}

	/// Requests loop termination. The pending read is abandoned and
	/// [`run`](Self::run) returns `Ok(())`.
	pub fn shutdown(&self) {
		self.shutdown.cancel();
	}

	pub fn is_shutdown(&self) -> bool {
		self.shutdown.is_cancelled()
	}

	/// Runs the dispatch loop until shutdown or a fatal transport error.
	///
	/// # Errors
	///
	/// - [`Error::AlreadyRunning`] if called more than once
	/// - Any reader or writer error that occurs before shutdown was requested,
	///   including [`Error::Closed`] when the server hangs up
	pub async fn run<R, W>(&self, mut reader: FrameReader<R>, mut writer: FrameWriter<W>) -> Result<()>
	where
		R: AsyncRead + Unpin,
		W: AsyncWrite + Unpin,
	{
		let mut outbound = self.outbound_rx.lock().take().ok_or(Error::AlreadyRunning)?;
		tracing::debug!("Dispatch loop started");

		let result = tokio::select! {
			biased;
			_ = self.shutdown.cancelled() => Ok(()),
			res = self.read_loop(&mut reader) => res,
			res = write_loop(&mut outbound, &mut writer) => res,
		};

		match result {
			Err(e) if self.shutdown.is_cancelled() => {
				tracing::debug!(error = %e, "Transport error during shutdown (ignored)");
				Ok(())
			}
			Err(e) => {
				tracing::error!(error = %e, "Dispatch loop failed");
				Err(e)
			}
			Ok(()) => {
				tracing::debug!("Dispatch loop stopped");
				Ok(())
			}
		}
	}

	async fn read_loop<R: AsyncRead + Unpin>(&self, reader: &mut FrameReader<R>) -> Result<()> {
		loop {
			let message: ActorMessage = reader.recv().await?;
			self.route(&message);
		}
	}

	fn route(&self, message: &ActorMessage) {
		if let Some(error) = &message.error {
			tracing::warn!(
				actor = %message.from,
				error = %error,
				detail = message.message.as_deref().unwrap_or_default(),
				"Remote error reply"
			);
		}
		self.registry.dispatch(message);
	}
}

async fn write_loop<W: AsyncWrite + Unpin>(
	outbound: &mut mpsc::UnboundedReceiver<ActorMessage>,
	writer: &mut FrameWriter<W>,
) -> Result<()> {
	while let Some(message) = outbound.recv().await {
		writer.send(&message).await?;
	}
	Ok(())
}
