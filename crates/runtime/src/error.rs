//! Error types for the foxrdp runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the debugger server.
#[derive(Debug, Error)]
pub enum Error {
	/// Malformed length prefix or a stream that ended mid-frame.
	#[error("Framing error: {0}")]
	Framing(String),

	/// Payload was not the expected JSON shape.
	#[error("Encoding error: {0}")]
	Encoding(#[from] serde_json::Error),

	/// Underlying socket failure.
	#[error("Connection error: {0}")]
	Connection(#[from] std::io::Error),

	/// The stream ended cleanly at a frame boundary.
	#[error("Connection closed by remote")]
	Closed,

	/// The outbound writer is gone, so commands can no longer be queued.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// A dispatch loop is already running (or has run) on this connection.
	#[error("Dispatch loop already started for this connection")]
	AlreadyRunning,

	/// A tab action was requested before the tab attached to a frame.
	#[error("Tab {tab} is not attached to a frame yet")]
	NotAttached { tab: String },
}

impl Error {
	/// Returns true if this error ends the connection.
	///
	/// Everything except [`Error::NotAttached`] leaves the stream unusable.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Error::NotAttached { .. })
	}
}
