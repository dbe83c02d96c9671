//! Length-prefixed JSON framing.
//!
//! Every frame on the wire is `<ascii decimal length>:<payload>`, where the
//! length counts payload bytes only. The read and write halves are separate
//! types that take `&mut self`, so each direction is serialized by ownership
//! rather than by a lock.

#[cfg(test)]
mod tests;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::error::{Error, Result};

/// Default size of the reusable receive buffer.
pub const DEFAULT_INITIAL_BUFFER_LEN: usize = 500;

/// Default upper bound on a single inbound frame.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Transport tunables.
#[derive(Debug, Clone)]
pub struct TransportConfig {
	/// Starting capacity of the receive buffer. It grows on demand and is never shrunk.
	pub initial_buffer_len: usize,
	/// Length prefixes above this are rejected as framing errors.
	pub max_frame_len: usize,
	/// Log raw payloads at debug level.
	pub log_messages: bool,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			initial_buffer_len: DEFAULT_INITIAL_BUFFER_LEN,
			max_frame_len: DEFAULT_MAX_FRAME_LEN,
			log_messages: false,
		}
	}
}

/// Connects to a debugger server and splits the socket into framed halves.
pub async fn dial(
	host: &str,
	port: u16,
	config: TransportConfig,
) -> Result<(FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>)> {
	let stream = TcpStream::connect((host, port)).await?;
	stream.set_nodelay(true)?;
	tracing::debug!(host, port, "Connected to debugger server");

	let (read_half, write_half) = stream.into_split();
	let log_messages = config.log_messages;
	Ok((
		FrameReader::new(read_half, config),
		FrameWriter::new(write_half, log_messages),
	))
}

/// Inbound half: decodes one frame per [`recv`](Self::recv) call.
pub struct FrameReader<R> {
	inner: BufReader<R>,
	buf: Vec<u8>,
	config: TransportConfig,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
	pub fn new(reader: R, config: TransportConfig) -> Self {
		Self {
			inner: BufReader::new(reader),
			buf: vec![0; config.initial_buffer_len],
			config,
		}
	}

	/// Reads the next whole frame and decodes its payload.
	///
	/// # Errors
	///
	/// - [`Error::Closed`] if the stream ends before the first prefix byte
	/// - [`Error::Framing`] for a bad prefix or a stream that ends mid-frame
	/// - [`Error::Encoding`] if the payload is not valid JSON for `T`
	/// - [`Error::Connection`] for any other I/O failure
	pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<T> {
		let len = self.read_len().await?;
		if self.buf.len() < len {
			self.buf.resize(len, 0);
		}

		let payload = &mut self.buf[..len];
		if let Err(e) = self.inner.read_exact(payload).await {
			return Err(match e.kind() {
				std::io::ErrorKind::UnexpectedEof => {
					Error::Framing(format!("stream ended inside a {len} byte payload"))
				}
				_ => Error::Connection(e),
			});
		}

		if self.config.log_messages {
			tracing::debug!(payload = %String::from_utf8_lossy(payload), "Received frame");
		} else {
			tracing::trace!(len, "Received frame");
		}

		Ok(serde_json::from_slice(payload)?)
	}

	/// Current size of the receive buffer.
	pub fn buffer_len(&self) -> usize {
		self.buf.len()
	}

	async fn read_len(&mut self) -> Result<usize> {
		let mut len: usize = 0;
		let mut digits = 0usize;

		loop {
			let byte = match self.inner.read_u8().await {
				Ok(byte) => byte,
				Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
					return Err(if digits == 0 {
						Error::Closed
					} else {
						Error::Framing("stream ended inside a length prefix".to_string())
					});
				}
				Err(e) => return Err(Error::Connection(e)),
			};

			match byte {
				b':' if digits > 0 => return Ok(len),
				b'0'..=b'9' => {
					len = len
						.checked_mul(10)
						.and_then(|n| n.checked_add(usize::from(byte - b'0')))
						.filter(|n| *n <= self.config.max_frame_len)
						.ok_or_else(|| {
							Error::Framing(format!(
								"frame length exceeds limit of {} bytes",
								self.config.max_frame_len
							))
						})?;
					digits += 1;
				}
				_ => {
					return Err(Error::Framing(format!(
						"unexpected byte {byte:#04x} in length prefix"
					)));
				}
			}
		}
	}
}

/// Outbound half: encodes and flushes one frame per [`send`](Self::send) call.
pub struct FrameWriter<W> {
	inner: BufWriter<W>,
	log_messages: bool,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
	pub fn new(writer: W, log_messages: bool) -> Self {
		Self {
			inner: BufWriter::new(writer),
			log_messages,
		}
	}

	/// Encodes `message` as JSON and writes it as a single frame.
	///
	/// Returns once the frame has been flushed to the underlying stream.
	pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
		let payload = serde_json::to_vec(message)?;

		if self.log_messages {
			tracing::debug!(payload = %String::from_utf8_lossy(&payload), "Sending frame");
		} else {
			tracing::trace!(len = payload.len(), "Sending frame");
		}

		self.inner.write_all(payload.len().to_string().as_bytes()).await?;
		self.inner.write_u8(b':').await?;
		self.inner.write_all(&payload).await?;
		self.inner.flush().await?;
		Ok(())
	}
}
