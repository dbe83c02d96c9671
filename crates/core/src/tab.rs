//! [`TabActor`]: local mirror of one browser tab.

use std::sync::{Arc, Weak};

use foxrdp_protocol::{ActorMessage, FrameDescriptor, TabDescriptor, kind, nav_state};
use foxrdp_runtime::{Error, Relay, Result};
use parking_lot::RwLock;

use crate::actor::{Actor, ActorContext};
use crate::root::RootActor;

/// Snapshot of the observable tab fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabState {
	pub selected: bool,
	pub title: String,
	pub url: String,
	/// True between a navigation's `start` and its `stop`.
	pub navigating: bool,
}

#[derive(Default)]
struct TabFields {
	/// Page-frame actor this tab is attached to. Changes across navigations.
	frame_id: Option<Arc<str>>,
	state: TabState,
}

/// One browser tab.
///
/// The id is fixed for the tab's lifetime and doubles as its registry key and
/// equality key. Accessors take a shared lock and may be called from any
/// thread; all mutation happens on the dispatch loop.
pub struct TabActor {
	id: Arc<str>,
	state_changed: Relay,
	favicon_changed: Relay,

	root: Weak<RootActor>,
	ctx: ActorContext,

	fields: RwLock<TabFields>,
	/// `None` until the first favicon reply; `Some(empty)` after an explicit clear.
	favicon: RwLock<Option<Arc<[u8]>>>,
}

impl TabActor {
	pub(crate) fn new(id: &str, root: Weak<RootActor>, ctx: ActorContext) -> Arc<Self> {
		Arc::new(Self {
			id: Arc::from(id),
			state_changed: Relay::new(),
			favicon_changed: Relay::new(),
			root,
			ctx,
			fields: RwLock::new(TabFields::default()),
			favicon: RwLock::new(None),
		})
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// Currently attached frame actor id, if any.
	pub fn frame_id(&self) -> Option<Arc<str>> {
		self.fields.read().frame_id.clone()
	}

	pub fn state(&self) -> TabState {
		self.fields.read().state.clone()
	}

	pub fn selected(&self) -> bool {
		self.fields.read().state.selected
	}

	pub fn title(&self) -> String {
		self.fields.read().state.title.clone()
	}

	pub fn url(&self) -> String {
		self.fields.read().state.url.clone()
	}

	pub fn navigating(&self) -> bool {
		self.fields.read().state.navigating
	}

	pub fn favicon(&self) -> Option<Arc<[u8]>> {
		self.favicon.read().clone()
	}

	/// Fires when selection, title, URL, or navigation state change.
	pub fn state_changed(&self) -> &Relay {
		&self.state_changed
	}

	/// Fires when the favicon bytes change.
	pub fn favicon_changed(&self) -> &Relay {
		&self.favicon_changed
	}

	/// Brings this tab to the foreground.
	///
	/// # Errors
	///
	/// [`Error::NotAttached`] before the tab's frame is known.
	pub fn set_focus(&self) -> Result<()> {
		let frame = self.attached_frame()?;
		self.ctx.send(ActorMessage::command(&*frame, kind::FOCUS))
	}

	/// Navigates this tab to `url`.
	///
	/// # Errors
	///
	/// [`Error::NotAttached`] before the tab's frame is known.
	pub fn navigate_to(&self, url: &str) -> Result<()> {
		let frame = self.attached_frame()?;
		self.ctx
			.send(ActorMessage::command(&*frame, kind::NAVIGATE_TO).with_url(url))
	}

	fn attached_frame(&self) -> Result<Arc<str>> {
		self.frame_id().ok_or_else(|| Error::NotAttached {
			tab: self.id.to_string(),
		})
	}

	pub(crate) fn on_message(self: &Arc<Self>, message: &ActorMessage) {
		if let Some(frame) = &message.frame {
			self.update_from_frame(frame);
		} else if message.is(kind::TAB_NAVIGATED) {
			self.update_from_navigation(message);
		} else if message.is(kind::TAB_DETACHED) {
			match self.root.upgrade() {
				Some(root) => root.remove_tab(&self.id),
				None => self.retire(),
			}
		} else if let Some(bytes) = &message.favicon {
			self.update_favicon(bytes);
		}
	}

	/// Applies a listing entry, then asks for the tab's frame target, which
	/// the descriptor does not carry.
	pub(crate) fn update_from_descriptor(&self, descriptor: &TabDescriptor) {
		self.commit(|current| TabState {
			selected: descriptor.selected,
			title: descriptor.title.clone(),
			url: descriptor.url.clone(),
			navigating: current.navigating,
		});
		self.ctx.post(ActorMessage::command(&*self.id, kind::GET_TARGET));
	}

	fn update_from_frame(self: &Arc<Self>, frame: &FrameDescriptor) {
		if frame.actor.is_empty() {
			tracing::debug!(actor = %self.id, "Frame descriptor without actor id (ignored)");
			return;
		}

		let replaced = {
			let mut fields = self.fields.write();
			if fields.frame_id.as_deref() == Some(frame.actor.as_str()) {
				None
			} else {
				Some(fields.frame_id.replace(Arc::from(frame.actor.as_str())))
			}
		};

		if let Some(previous) = replaced {
			let registry = self.ctx.registry();
			if let Some(previous) = previous {
				registry.remove(&previous);
			}
			tracing::debug!(actor = %self.id, frame = %frame.actor, "Attaching to frame");
			registry.set(frame.actor.as_str(), Actor::Tab(Arc::clone(self)));
			self.ctx.post(ActorMessage::command(frame.actor.as_str(), kind::ATTACH));
		}

		self.commit(|current| TabState {
			title: frame.title.clone(),
			url: frame.url.clone(),
			..current.clone()
		});
	}

	fn update_from_navigation(&self, message: &ActorMessage) {
		self.commit(|current| TabState {
			selected: current.selected,
			title: message.title.clone(),
			url: message.url.clone(),
			navigating: message.state == nav_state::START,
		});
		// Only fetch the icon once loading has finished.
		if message.state == nav_state::STOP {
			self.ctx.post(ActorMessage::command(&*self.id, kind::GET_FAVICON));
		}
	}

	/// Replaces all four state fields at once, firing a single pulse if any differ.
	fn commit(&self, update: impl FnOnce(&TabState) -> TabState) {
		let changed = {
			let mut fields = self.fields.write();
			let next = update(&fields.state);
			if next == fields.state {
				false
			} else {
				fields.state = next;
				true
			}
		};
		if changed {
			self.state_changed.fire();
		}
	}

	fn update_favicon(&self, bytes: &[u8]) {
		let changed = {
			let mut favicon = self.favicon.write();
			if favicon.as_deref() == Some(bytes) {
				false
			} else {
				*favicon = Some(Arc::from(bytes));
				true
			}
		};
		if changed {
			self.favicon_changed.fire();
		}
	}

	/// Unregisters the tab id and its frame id.
	pub(crate) fn retire(&self) {
		let frame = self.fields.write().frame_id.take();
		let registry = self.ctx.registry();
		registry.remove(&self.id);
		if let Some(frame) = frame {
			registry.remove(&frame);
		}
	}
}

impl PartialEq for TabActor {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TabActor {}

impl std::fmt::Debug for TabActor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let fields = self.fields.read();
		f.debug_struct("TabActor")
			.field("id", &self.id)
			.field("frame_id", &fields.frame_id)
			.field("state", &fields.state)
			.finish()
	}
}
