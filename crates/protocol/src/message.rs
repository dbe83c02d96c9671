//! Protocol message envelope and descriptor payloads.

use serde::{Deserialize, Deserializer, Serialize};

/// Fixed id of the session's root actor.
pub const ROOT_ACTOR: &str = "root";

/// Command and event tags carried in the `type` field.
pub mod kind {
	pub const LIST_TABS: &str = "listTabs";
	pub const TAB_LIST_CHANGED: &str = "tabListChanged";
	pub const TAB_NAVIGATED: &str = "tabNavigated";
	pub const TAB_DETACHED: &str = "tabDetached";
	pub const NAVIGATE_TO: &str = "navigateTo";
	pub const FOCUS: &str = "focus";
	pub const GET_TARGET: &str = "getTarget";
	pub const GET_FAVICON: &str = "getFavicon";
	pub const ATTACH: &str = "attach";
}

/// Values of the `state` field on `tabNavigated` events.
pub mod nav_state {
	pub const START: &str = "start";
	pub const STOP: &str = "stop";
}

/// A single protocol message, in either direction.
///
/// Outbound commands set [`to`](Self::to) and never [`from`](Self::from);
/// inbound replies and events always carry `from`. Empty strings and `None`
/// fields are omitted when encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorMessage {
	/// Destination actor id (outbound only).
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub to: String,
	/// Source actor id (inbound only).
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub from: String,
	/// Command or event tag.
	#[serde(
		rename = "type",
		default,
		deserialize_with = "nullable_string",
		skip_serializing_if = "String::is_empty"
	)]
	pub kind: String,

	/// Tab descriptors from a `listTabs` reply.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tabs: Option<Vec<TabDescriptor>>,
	/// Frame descriptor from a `getTarget` reply or frame update.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame: Option<FrameDescriptor>,
	#[serde(default, deserialize_with = "nullable_string", skip_serializing_if = "String::is_empty")]
	pub title: String,
	#[serde(default, deserialize_with = "nullable_string", skip_serializing_if = "String::is_empty")]
	pub url: String,
	/// Navigation state tag, see [`nav_state`].
	#[serde(default, deserialize_with = "nullable_string", skip_serializing_if = "String::is_empty")]
	pub state: String,
	/// Favicon payload. `None` when the field was absent, `Some(empty)` when
	/// it was present but carried no bytes.
	#[serde(
		default,
		deserialize_with = "crate::favicon::deserialize_present",
		skip_serializing_if = "Option::is_none"
	)]
	pub favicon: Option<Vec<u8>>,

	/// Error name on a failed request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Human-readable detail accompanying [`error`](Self::error).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl ActorMessage {
	/// Builds an outbound command addressed to `to`.
	pub fn command(to: impl Into<String>, kind: &str) -> Self {
		Self {
			to: to.into(),
			kind: kind.to_string(),
			..Self::default()
		}
	}

	/// Sets the `url` field, used by `navigateTo`.
	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	/// Returns true if the `type` field equals `kind`.
	pub fn is(&self, kind: &str) -> bool {
		self.kind == kind
	}
}

/// Tab entry in a `listTabs` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDescriptor {
	pub actor: String,
	#[serde(default)]
	pub selected: bool,
	#[serde(default, deserialize_with = "nullable_string")]
	pub title: String,
	#[serde(default, deserialize_with = "nullable_string")]
	pub url: String,
}

/// Page-frame target reported for a tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
	pub actor: String,
	#[serde(default, deserialize_with = "nullable_string")]
	pub title: String,
	#[serde(default, deserialize_with = "nullable_string")]
	pub url: String,
}

/// The server sends `null` for titles of blank pages.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
