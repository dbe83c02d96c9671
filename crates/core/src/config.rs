use foxrdp_runtime::TransportConfig;
use foxrdp_runtime::transport::{DEFAULT_INITIAL_BUFFER_LEN, DEFAULT_MAX_FRAME_LEN};
use serde::{Deserialize, Serialize};

/// Port the debugger server is conventionally started on.
pub const DEFAULT_DEBUG_PORT: u16 = 49022;

/// Connection settings for a [`Session`](crate::Session).
///
/// The address is supplied by whatever launched or discovered the browser;
/// this crate does not start processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
	pub host: String,
	pub port: u16,
	/// Log every raw frame payload at debug level.
	pub log_messages: bool,
	/// Largest inbound frame accepted, in bytes.
	pub max_frame_len: usize,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: DEFAULT_DEBUG_PORT,
			log_messages: false,
			max_frame_len: DEFAULT_MAX_FRAME_LEN,
		}
	}
}

impl SessionConfig {
	pub fn transport(&self) -> TransportConfig {
		TransportConfig {
			initial_buffer_len: DEFAULT_INITIAL_BUFFER_LEN,
			max_frame_len: self.max_frame_len,
			log_messages: self.log_messages,
		}
	}
}
