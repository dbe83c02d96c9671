//! Favicon payload decoding.
//!
//! The field is tri-state on the wire: absent (no update), present but empty
//! (explicit clear), or present with image bytes. Serde only invokes
//! [`deserialize_present`] when the key exists, so absence stays `None`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum FaviconRepr {
	Bytes(Vec<u8>),
	Base64(String),
}

/// Decodes a favicon field that is known to be present.
///
/// Accepts an array of byte values, a base64 string, or `null`. `null` and
/// the empty string both decode to an empty payload.
pub fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
	D: Deserializer<'de>,
{
	let bytes = match Option::<FaviconRepr>::deserialize(deserializer)? {
		None => Vec::new(),
		Some(FaviconRepr::Bytes(bytes)) => bytes,
		Some(FaviconRepr::Base64(text)) => STANDARD.decode(text.as_bytes()).map_err(D::Error::custom)?,
	};
	Ok(Some(bytes))
}
