//! Closed set of actor kinds and the context they share.

use std::sync::Arc;

use foxrdp_protocol::ActorMessage;
use foxrdp_runtime::{ActorRegistry, MessageHandler, Outbox, Result};

use crate::root::RootActor;
use crate::tab::TabActor;

/// Registry entry: the handler responsible for one actor id.
///
/// A tab appears under two ids once attached: its own id and its current
/// frame actor id.
#[derive(Clone)]
pub enum Actor {
	Root(Arc<RootActor>),
	Tab(Arc<TabActor>),
}

impl MessageHandler for Actor {
	fn on_message(&self, message: &ActorMessage) {
		match self {
			Actor::Root(root) => root.on_message(message),
			Actor::Tab(tab) => tab.on_message(message),
		}
	}
}

/// Registry and outbound queue handed to every actor.
#[derive(Clone)]
pub struct ActorContext {
	registry: ActorRegistry<Actor>,
	outbox: Outbox,
}

impl ActorContext {
	pub fn new(registry: ActorRegistry<Actor>, outbox: Outbox) -> Self {
		Self { registry, outbox }
	}

	pub fn registry(&self) -> &ActorRegistry<Actor> {
		&self.registry
	}

	pub(crate) fn send(&self, message: ActorMessage) -> Result<()> {
		self.outbox.send(message)
	}

	/// Queues a command from inside a handler, where there is no caller to
	/// return the error to.
	pub(crate) fn post(&self, message: ActorMessage) {
		if let Err(e) = self.outbox.send(message) {
			tracing::error!(error = %e, "Failed sending command");
		}
	}
}
