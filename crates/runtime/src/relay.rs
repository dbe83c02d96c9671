//! Change-notification relay.
//!
//! A [`Relay`] fans a payload-free "changed" pulse out to every registered
//! destination. Delivery is best-effort: a destination whose queue is full
//! simply misses that pulse, and [`Relay::fire`] never blocks or fails.
//! Observers are expected to re-read current state on each pulse rather than
//! count them.
//!
//! Two consumption patterns are supported:
//!
//! 1. **Channels**: [`Relay::register`] a bounded [`mpsc::Sender`] and drain it
//! 2. **Callbacks**: [`Relay::subscribe`] spawns a draining task and returns a
//!    [`RelaySubscription`] that cancels it on drop

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

/// Capacity of the destination created by [`Relay::subscribe`].
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 2;

/// Non-blocking broadcast of "state changed" pulses.
///
/// Cloning yields another handle to the same set of destinations.
#[derive(Clone, Default)]
pub struct Relay {
	destinations: Arc<RwLock<Vec<mpsc::Sender<()>>>>,
}

impl Relay {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a delivery destination. Registering the same channel twice is a no-op.
	pub fn register(&self, tx: &mpsc::Sender<()>) {
		let mut destinations = self.destinations.write();
		if !destinations.iter().any(|existing| existing.same_channel(tx)) {
			destinations.push(tx.clone());
		}
	}

	/// Removes a destination. Unknown channels are ignored.
	pub fn unregister(&self, tx: &mpsc::Sender<()>) {
		self.destinations
			.write()
			.retain(|existing| !existing.same_channel(tx));
	}

	/// Attempts to deliver one pulse to every destination.
	///
	/// Destinations whose receiver has been dropped are pruned.
	pub fn fire(&self) {
		let mut closed = false;
		for tx in self.destinations.read().iter() {
			match tx.try_send(()) {
				Ok(()) | Err(TrySendError::Full(())) => {}
				Err(TrySendError::Closed(())) => closed = true,
			}
		}

		if closed {
			let mut destinations = self.destinations.write();
			let before = destinations.len();
			destinations.retain(|tx| !tx.is_closed());
			tracing::trace!(pruned = before - destinations.len(), "Dropped closed relay destinations");
		}
	}

	/// Number of registered destinations.
	pub fn observer_count(&self) -> usize {
		self.destinations.read().len()
	}

	/// Invokes `callback` once per received pulse on a background task.
	///
	/// Must be called from within a tokio runtime.
	pub fn subscribe<F>(&self, callback: F) -> RelaySubscription
	where
		F: Fn() + Send + 'static,
	{
		self.subscribe_with_capacity(DEFAULT_SUBSCRIPTION_CAPACITY, callback)
	}

	/// Like [`subscribe`](Self::subscribe) with an explicit destination capacity.
	pub fn subscribe_with_capacity<F>(&self, capacity: usize, callback: F) -> RelaySubscription
	where
		F: Fn() + Send + 'static,
	{
		let (tx, mut rx) = mpsc::channel(capacity.max(1));
		let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
		self.register(&tx);

		let relay = self.clone();
		tokio::spawn(async move {
			loop {
				tokio::select! {
					biased;
					_ = &mut cancel_rx => break,
					pulse = rx.recv() => match pulse {
						Some(()) => callback(),
						None => break,
					},
				}
			}
			relay.unregister(&tx);
		});

		RelaySubscription {
			cancel_tx: Some(cancel_tx),
		}
	}
}

impl std::fmt::Debug for Relay {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Relay")
			.field("observers", &self.observer_count())
			.finish()
	}
}

/// RAII handle that cancels a relay callback when dropped.
///
/// The draining task unregisters its destination as it exits, so the relay
/// stops holding the channel shortly after cancellation.
pub struct RelaySubscription {
	cancel_tx: Option<oneshot::Sender<()>>,
}

impl RelaySubscription {
	/// Explicitly cancels the subscription, equivalent to dropping it.
	pub fn unsubscribe(mut self) {
		if let Some(tx) = self.cancel_tx.take() {
			let _ = tx.send(());
		}
	}
}

impl Drop for RelaySubscription {
	fn drop(&mut self) {
		if let Some(tx) = self.cancel_tx.take() {
			let _ = tx.send(());
		}
	}
}

impl std::fmt::Debug for RelaySubscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RelaySubscription")
			.field("active", &self.cancel_tx.is_some())
			.finish()
	}
}
