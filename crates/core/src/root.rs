//! [`RootActor`]: the session's top-level actor and owner of the tab list.

use std::sync::{Arc, Weak};

use foxrdp_protocol::{ActorMessage, ROOT_ACTOR, TabDescriptor, kind};
use foxrdp_runtime::{Relay, Result};
use parking_lot::RwLock;

use crate::actor::{Actor, ActorContext};
use crate::tab::TabActor;

/// Immutable snapshot of the tab list, in browser order.
///
/// The root replaces its list wholesale on change, so a snapshot held by an
/// observer never changes underneath it.
pub type TabList = Arc<[Arc<TabActor>]>;

/// The debugging session's root actor.
///
/// Starts *uninitialized* and moves to *tracking* on the first tab-list reply.
pub struct RootActor {
	tab_list_changed: Relay,
	ctx: ActorContext,
	/// `None` until the first listing arrives.
	tabs: RwLock<Option<TabList>>,
	me: Weak<RootActor>,
}

impl RootActor {
	/// Creates the root and registers it under [`ROOT_ACTOR`].
	pub fn install(ctx: ActorContext) -> Arc<Self> {
		let root = Arc::new_cyclic(|me| Self {
			tab_list_changed: Relay::new(),
			ctx: ctx.clone(),
			tabs: RwLock::new(None),
			me: me.clone(),
		});
		ctx.registry().set(ROOT_ACTOR, Actor::Root(Arc::clone(&root)));
		root
	}

	pub fn id(&self) -> &str {
		ROOT_ACTOR
	}

	/// Requests the initial tab listing.
	pub fn begin(&self) -> Result<()> {
		self.ctx.send(list_tabs())
	}

	/// Current tab list. Empty while uninitialized.
	pub fn tabs(&self) -> TabList {
		self.tabs.read().clone().unwrap_or_else(|| Arc::from(Vec::new()))
	}

	/// Looks up a listed tab by actor id.
	pub fn tab(&self, id: &str) -> Option<Arc<TabActor>> {
		self.tabs
			.read()
			.as_deref()
			.and_then(|tabs| tabs.iter().find(|tab| tab.id() == id).cloned())
	}

	/// True once a tab list has been received.
	pub fn is_tracking(&self) -> bool {
		self.tabs.read().is_some()
	}

	/// Fires whenever tabs are added, removed, or reordered.
	pub fn tab_list_changed(&self) -> &Relay {
		&self.tab_list_changed
	}

	pub(crate) fn on_message(&self, message: &ActorMessage) {
		if message.is(kind::TAB_LIST_CHANGED) {
			// The event carries no data, it only says the listing is stale.
			self.ctx.post(list_tabs());
		} else if let Some(descriptors) = &message.tabs {
			self.reconcile(descriptors);
		} else {
			tracing::debug!(kind = %message.kind, "Root message ignored");
		}
	}

	/// Brings the tab list in line with a fresh listing.
	///
	/// Tabs are matched by id against the whole current list so that a tab
	/// that moved keeps its actor, and with it any observer subscriptions.
	/// The list only counts as changed when its length or the id at some
	/// position differs. Matching is quadratic in the number of tabs.
	fn reconcile(&self, descriptors: &[TabDescriptor]) {
		let previous = self.tabs.read().clone();
		let old: &[Arc<TabActor>] = previous.as_deref().unwrap_or_default();

		let mut next: Vec<Arc<TabActor>> = Vec::with_capacity(descriptors.len());
		for descriptor in descriptors {
			let existing = old
				.iter()
				.chain(next.iter())
				.find(|tab| tab.id() == descriptor.actor)
				.cloned();
			let tab = match existing {
				Some(tab) => tab,
				None => {
					tracing::debug!(actor = %descriptor.actor, "New tab");
					let tab = TabActor::new(&descriptor.actor, self.me.clone(), self.ctx.clone());
					self.ctx
						.registry()
						.set(descriptor.actor.as_str(), Actor::Tab(Arc::clone(&tab)));
					tab
				}
			};
			tab.update_from_descriptor(descriptor);
			next.push(tab);
		}

		let changed = previous.is_none()
			|| old.len() != next.len()
			|| old.iter().zip(&next).any(|(a, b)| a.id() != b.id());
		if !changed {
			return;
		}

		for tab in old {
			if !next.iter().any(|t| t.id() == tab.id()) {
				tracing::debug!(actor = %tab.id(), "Tab no longer listed");
				tab.retire();
			}
		}

		tracing::debug!(len = next.len(), "Tab list changed");
		*self.tabs.write() = Some(next.into());
		self.tab_list_changed.fire();
	}

	/// Drops a detached tab and asks for a fresh listing to confirm.
	pub fn remove_tab(&self, id: &str) {
		let removed = {
			let mut tabs = self.tabs.write();
			let current = tabs.as_deref().unwrap_or_default();
			let found = current.iter().find(|tab| tab.id() == id).cloned();
			if found.is_some() {
				let kept: Vec<_> = current.iter().filter(|t| t.id() != id).cloned().collect();
				*tabs = Some(kept.into());
			}
			found
		};

		match removed {
			Some(tab) => {
				tracing::debug!(actor = id, "Tab detached");
				tab.retire();
				self.tab_list_changed.fire();
			}
			None => {
				self.ctx.registry().remove(id);
			}
		}

		self.ctx.post(list_tabs());
	}
}

fn list_tabs() -> ActorMessage {
	ActorMessage::command(ROOT_ACTOR, kind::LIST_TABS)
}
