//! Thread-safe actor registry.
//!
//! Uses [`DashMap`] so the dispatch loop's lookups run concurrently with
//! accessors on other threads. Handlers are cloned out of the map before
//! being invoked, which lets a handler add or remove entries (including its
//! own) while it runs.

use std::sync::Arc;

use dashmap::DashMap;
use foxrdp_protocol::ActorMessage;

/// Receiver of inbound messages routed by actor id.
///
/// Implemented by the closed set of actor kinds. Handlers run on the dispatch
/// loop, one at a time, and must return promptly.
pub trait MessageHandler: Clone + Send + Sync + 'static {
	fn on_message(&self, message: &ActorMessage);
}

/// Mapping from actor id to the handler responsible for it.
pub struct ActorRegistry<H> {
	actors: Arc<DashMap<Arc<str>, H>>,
}

impl<H> Clone for ActorRegistry<H> {
	fn clone(&self) -> Self {
		Self {
			actors: Arc::clone(&self.actors),
		}
	}
}

impl<H: MessageHandler> Default for ActorRegistry<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H: MessageHandler> ActorRegistry<H> {
	pub fn new() -> Self {
		Self {
			actors: Arc::new(DashMap::new()),
		}
	}

	/// Installs or replaces the handler for `id`.
	pub fn set(&self, id: impl Into<Arc<str>>, handler: H) {
		let id = id.into();
		tracing::trace!(actor = %id, "Registering actor");
		self.actors.insert(id, handler);
	}

	/// Uninstalls the handler for `id`, returning it if present.
	pub fn remove(&self, id: &str) -> Option<H> {
		tracing::trace!(actor = id, "Unregistering actor");
		self.actors.remove(id).map(|(_, handler)| handler)
	}

	pub fn get(&self, id: &str) -> Option<H> {
		self.actors.get(id).map(|entry| entry.value().clone())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.actors.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.actors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.actors.is_empty()
	}

	/// Drops every handler. Used at teardown to break actor reference cycles.
	pub fn clear(&self) {
		self.actors.clear();
	}

	/// Routes `message` to the handler registered under its `from` id.
	///
	/// Returns false if the message was dropped: either it has no `from` or
	/// no handler is registered for it. The remote side may still reference
	/// actors this client has already retired, so neither case is an error.
	pub fn dispatch(&self, message: &ActorMessage) -> bool {
		if message.from.is_empty() {
			tracing::debug!(kind = %message.kind, "Message without sender (ignored)");
			return false;
		}

		match self.get(&message.from) {
			Some(handler) => {
				handler.on_message(message);
				true
			}
			None => {
				tracing::debug!(
					actor = %message.from,
					kind = %message.kind,
					"Message for unknown actor (ignored)"
				);
				false
			}
		}
	}
}
