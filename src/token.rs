//! The in-memory token object: algorithm, key material, headers, and grants,
//! plus the accessors that mutate them.

use std::cell::Cell;
use std::str::FromStr;

use serde_json::Value;
use zeroize::Zeroizing;

use crate::algorithm::Algorithm;
use crate::crypto;
use crate::error::{Error, ErrorKind};
use crate::json::{self, JsonObject};

/// A JWT in memory: its algorithm, key material, header object, and grant
/// (claims) object.
///
/// Typed getters (`header_str`, `grant_int`, ...) use a "getter-style"
/// error-carrier convention: on a miss they return `None` and record
/// [`ErrorKind::NotPresent`] for [`Token::last_error`], rather than
/// returning a `Result`. Every other operation — `set_alg`, the `add_*`
/// family, [`Token::encode`], [`Token::decode`] — returns a
/// `Result<_, Error>` directly.
#[derive(Debug)]
pub struct Token {
    alg: Algorithm,
    key: Option<Zeroizing<Vec<u8>>>,
    headers: JsonObject,
    grants: JsonObject,
    last_error: Cell<Option<ErrorKind>>,
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl Token {
    /// Construct an empty token: `alg = NONE`, no key, empty headers and
    /// grants.
    pub fn new() -> Self {
        Token {
            alg: Algorithm::None,
            key: None,
            headers: json::new_object(),
            grants: json::new_object(),
            last_error: Cell::new(None),
        }
    }

    /// Deep-copy this token, including its key material.
    ///
    /// A thin, spec-named alias for [`Clone::clone`].
    pub fn dup(&self) -> Self {
        self.clone()
    }

    /// The current algorithm.
    pub fn alg(&self) -> Algorithm {
        self.alg
    }

    /// The current key, if any. Always `None` when `alg` is `NONE`: the two
    /// fields are kept in lockstep by [`Token::set_alg`], which is the only
    /// way to change either.
    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    /// Change the algorithm, and with it the key.
    ///
    /// The existing key is zero-wiped *before* the new algorithm is
    /// validated, even if the change is ultimately rejected — matching the
    /// spec's "unconditionally scrub the current key first" rule.
    ///
    /// Fails with [`Error::KeyRequired`] if `alg != NONE` and `key` is
    /// absent or empty, [`Error::KeyNotAllowed`] if `alg == NONE` and a key
    /// was supplied, or [`Error::NoMemory`] if reserving storage for the new
    /// key buffer fails.
    pub fn set_alg(&mut self, alg: Algorithm, key: Option<&[u8]>) -> Result<(), Error> {
        self.key.take(); // zero-wiped on drop by `Zeroizing`

        if alg.requires_key() {
            match key {
                Some(bytes) if !bytes.is_empty() => {
                    self.key = Some(Zeroizing::new(try_copy_key(bytes)?));
                }
                _ => return Err(Error::KeyRequired(alg)),
            }
        } else if key.is_some() {
            return Err(Error::KeyNotAllowed);
        }

        self.alg = alg;
        Ok(())
    }

    /// The last [`ErrorKind`] recorded by a getter-style accessor, if any.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error.get()
    }

    fn record_miss(&self, name: &str) {
        self.last_error.set(Some(ErrorKind::NotPresent));
        let _ = name; // name is surfaced via Error::NotPresent elsewhere; kept for symmetry
    }

    fn clear_error(&self) {
        self.last_error.set(None);
    }

    // --- headers -----------------------------------------------------

    /// Insert a string header, failing with [`Error::Exists`] if `name` is
    /// already present holding a string.
    pub fn add_header_str(&mut self, name: &str, value: impl Into<String>) -> Result<(), Error> {
        json::set_checked(
            &mut self.headers,
            name,
            Value::String(value.into()),
            Value::is_string,
        )
    }

    /// Insert an integer header, failing with [`Error::Exists`] if `name`
    /// is already present holding an integer.
    pub fn add_header_int(&mut self, name: &str, value: i64) -> Result<(), Error> {
        json::set_checked(&mut self.headers, name, Value::from(value), Value::is_i64)
    }

    /// Insert a boolean header, failing with [`Error::Exists`] if `name` is
    /// already present holding a boolean.
    pub fn add_header_bool(&mut self, name: &str, value: bool) -> Result<(), Error> {
        json::set_checked(&mut self.headers, name, Value::from(value), Value::is_boolean)
    }

    /// Parse `blob` as a JSON object and merge it into the headers,
    /// rejecting any name already present.
    pub fn add_headers_json(&mut self, blob: &str) -> Result<(), Error> {
        json::merge_json(&mut self.headers, blob)
    }

    /// Get a string header.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        match self.headers.get(name).and_then(Value::as_str) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Get an integer header.
    pub fn header_int(&self, name: &str) -> Option<i64> {
        match self.headers.get(name).and_then(Value::as_i64) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Get a boolean header.
    pub fn header_bool(&self, name: &str) -> Option<bool> {
        match self.headers.get(name).and_then(Value::as_bool) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Get the raw JSON subtree stored at `name`, whatever its shape.
    pub fn header_value(&self, name: &str) -> Option<&Value> {
        match self.headers.get(name) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Serialize the whole header object, or just the subtree named by
    /// `name`, with sorted keys and no insignificant whitespace.
    pub fn headers_json(&self, name: Option<&str>) -> Result<String, Error> {
        json::dump_compact(&self.headers, name)
    }

    /// Remove one header, or every header if `name` is `None`.
    pub fn remove_header(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.headers.remove(name);
            }
            None => self.headers.clear(),
        }
    }

    /// Direct read access to the header object, e.g. for `foreach`-style
    /// iteration.
    pub fn headers(&self) -> &JsonObject {
        &self.headers
    }

    // --- grants --------------------------------------------------------

    /// Insert a string grant, failing with [`Error::Exists`] if `name` is
    /// already present holding a string.
    pub fn add_grant_str(&mut self, name: &str, value: impl Into<String>) -> Result<(), Error> {
        json::set_checked(
            &mut self.grants,
            name,
            Value::String(value.into()),
            Value::is_string,
        )
    }

    /// Insert an integer grant, failing with [`Error::Exists`] if `name` is
    /// already present holding an integer.
    pub fn add_grant_int(&mut self, name: &str, value: i64) -> Result<(), Error> {
        json::set_checked(&mut self.grants, name, Value::from(value), Value::is_i64)
    }

    /// Insert a boolean grant, failing with [`Error::Exists`] if `name` is
    /// already present holding a boolean.
    pub fn add_grant_bool(&mut self, name: &str, value: bool) -> Result<(), Error> {
        json::set_checked(&mut self.grants, name, Value::from(value), Value::is_boolean)
    }

    /// Insert an arbitrary JSON value grant (e.g. the array form of `aud`),
    /// failing with [`Error::Exists`] if `name` is already present with a
    /// structurally-equal value kind.
    pub fn add_grant_value(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if self.grants.contains_key(name) {
            return Err(Error::Exists(name.to_owned()));
        }
        self.grants.insert(name.to_owned(), value);
        Ok(())
    }

    /// Parse `blob` as a JSON object and merge it into the grants,
    /// rejecting any name already present.
    pub fn add_grants_json(&mut self, blob: &str) -> Result<(), Error> {
        json::merge_json(&mut self.grants, blob)
    }

    /// Get a string grant.
    pub fn grant_str(&self, name: &str) -> Option<&str> {
        match self.grants.get(name).and_then(Value::as_str) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Get an integer grant.
    pub fn grant_int(&self, name: &str) -> Option<i64> {
        match self.grants.get(name).and_then(Value::as_i64) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Get a boolean grant.
    pub fn grant_bool(&self, name: &str) -> Option<bool> {
        match self.grants.get(name).and_then(Value::as_bool) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Get the raw JSON subtree stored at `name`, whatever its shape.
    pub fn grant_value(&self, name: &str) -> Option<&Value> {
        match self.grants.get(name) {
            Some(value) => {
                self.clear_error();
                Some(value)
            }
            None => {
                self.record_miss(name);
                None
            }
        }
    }

    /// Serialize the whole grants object, or just the subtree named by
    /// `name`, with sorted keys and no insignificant whitespace.
    pub fn grants_json(&self, name: Option<&str>) -> Result<String, Error> {
        json::dump_compact(&self.grants, name)
    }

    /// Remove one grant, or every grant if `name` is `None`.
    pub fn remove_grant(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.grants.remove(name);
            }
            None => self.grants.clear(),
        }
    }

    /// Singular alias for [`Token::remove_grant`] with a single name; the
    /// source library aliases `jwt_del_grant` to `jwt_del_grants` and this
    /// crate keeps both spellings for readers coming from it.
    pub fn remove_single_grant(&mut self, name: &str) {
        self.remove_grant(Some(name));
    }

    /// Direct read access to the grants object, e.g. for `foreach`-style
    /// iteration.
    pub fn grants(&self) -> &JsonObject {
        &self.grants
    }

    // --- encode / decode / dump ----------------------------------------

    /// Encode this token as a compact JWS string.
    pub fn encode(&self) -> Result<String, Error> {
        crate::encode::encode(self)
    }

    /// Decode and verify a compact JWS string. `key` is the verifying key:
    /// the raw HMAC secret, or a PEM-encoded RSA/ECDSA public key. Pass
    /// `None` only for tokens whose header declares `alg: none`.
    pub fn decode(input: &str, key: Option<&[u8]>) -> Result<Token, Error> {
        crate::decode::decode(input, key)
    }

    /// Render `header.payload` (no signature) for human inspection. With
    /// `pretty`, both objects are 4-space indented and the header is
    /// preceded by a newline; otherwise both are compact and sorted.
    pub fn dump(&self, pretty: bool) -> Result<String, Error> {
        if pretty {
            let header = json::dump_pretty(&Value::Object(self.headers.clone()))?;
            let payload = json::dump_pretty(&Value::Object(self.grants.clone()))?;
            Ok(format!("{header}.{payload}"))
        } else {
            let header = json::dump_compact(&self.headers, None)?;
            let payload = json::dump_compact(&self.grants, None)?;
            Ok(format!("{header}.{payload}"))
        }
    }

    pub(crate) fn from_parts(
        alg: Algorithm,
        key: Option<Vec<u8>>,
        headers: JsonObject,
        grants: JsonObject,
    ) -> Self {
        Token {
            alg,
            key: key.map(Zeroizing::new),
            headers,
            grants,
            last_error: Cell::new(None),
        }
    }
}

impl Clone for Token {
    fn clone(&self) -> Self {
        Token {
            alg: self.alg,
            key: self.key.clone(),
            headers: self.headers.clone(),
            grants: self.grants.clone(),
            last_error: Cell::new(None),
        }
    }
}

/// Look up `alg` as a string, parsing it into an [`Algorithm`].
pub(crate) fn parse_algorithm(name: &str) -> Result<Algorithm, Error> {
    Algorithm::from_str(name)
}

/// Copy `bytes` into a freshly reserved `Vec`, surfacing an allocation
/// failure as [`Error::NoMemory`] instead of aborting the process.
///
/// This is the one storage reservation in the crate worth making fallible:
/// the key buffer is the only allocation a caller controls the size of
/// (headers and grants grow one small JSON value at a time via
/// `serde_json`, which has no fallible-reservation entry point to hook).
fn try_copy_key(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())
        .map_err(|_| Error::NoMemory)?;
    buf.extend_from_slice(bytes);
    Ok(buf)
}

/// Sign `message` under `alg` and `key`, used by the encoder.
pub(crate) fn sign(alg: Algorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
    crypto::sign(alg, key, message)
}

/// Verify `signature` over `message` under `alg` and `key`, used by the
/// decoder.
pub(crate) fn verify(
    alg: Algorithm,
    key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    crypto::verify(alg, key, message, signature)
}
