//! Thin wrapper over the `base64` crate's URL-safe, unpadded engine.
//!
//! The JWS Compact Serialization alphabet is `A-Z a-z 0-9 - _` with no `=`
//! padding on either side. `base64::engine::general_purpose::URL_SAFE_NO_PAD`
//! already implements exactly that contract in both directions, so this
//! module exists only to give it a crate-local name and to translate
//! `base64::DecodeError` into [`crate::Error`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::Error;

/// Encode `bytes` as unpadded base64url. Empty input yields an empty string.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode an unpadded base64url segment.
pub fn decode(text: &str) -> Result<Vec<u8>, Error> {
    URL_SAFE_NO_PAD.decode(text).map_err(Error::from)
}
