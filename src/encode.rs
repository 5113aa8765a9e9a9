//! Encode path: canonical header injection, segment encoding, signing.

use serde_json::Value;
use tracing::trace;

use crate::base64url;
use crate::json::{self, JsonObject};
use crate::token::{self, Token};
use crate::Error;

/// Encode `token` as a compact JWS string.
///
/// Builds a scratch copy of the header object with `alg` (and, when signed,
/// `typ: "JWT"`) injected, so the caller's own header object is left exactly
/// as they set it. `encode` takes `&Token`, not `&mut Token`: the canonical
/// `alg`/`typ` pair is regenerated into a local copy on every call rather
/// than being written back into the token, so the token's own header object
/// always reflects only what the caller explicitly set on it.
pub fn encode(token: &Token) -> Result<String, Error> {
    trace!(alg = %token.alg(), "encoding token");
    let header = canonical_header(token);

    let header_json = json::dump_compact(&header, None)?;
    let payload_json = json::dump_compact(token.grants(), None)?;

    let h64 = base64url::encode(header_json.as_bytes());
    let p64 = base64url::encode(payload_json.as_bytes());

    let mut signing_input = String::with_capacity(h64.len() + p64.len() + 1);
    signing_input.push_str(&h64);
    signing_input.push('.');
    signing_input.push_str(&p64);

    let alg = token.alg();
    if !alg.requires_key() {
        signing_input.push('.');
        trace!(alg = %alg, len = signing_input.len(), "encoded token");
        return Ok(signing_input);
    }

    let key = token.key().ok_or(Error::KeyRequired(alg))?;
    let signature = token::sign(alg, key, signing_input.as_bytes())?;

    signing_input.push('.');
    signing_input.push_str(&base64url::encode(signature));
    trace!(alg = %alg, len = signing_input.len(), "encoded token");
    Ok(signing_input)
}

/// Build the canonical header object: a copy of `token`'s headers with any
/// existing `alg`/`typ` removed and the correct ones inserted.
fn canonical_header(token: &Token) -> JsonObject {
    let mut header = token.headers().clone();
    header.remove("alg");
    if token.alg().requires_key() {
        header.remove("typ");
        header.insert("typ".to_owned(), Value::String("JWT".to_owned()));
    }
    header.insert(
        "alg".to_owned(),
        Value::String(token.alg().name().to_owned()),
    );
    header
}
