//! Decode path: segmentation, header verification, body parse, signature
//! verification.

use std::str::FromStr;

use serde_json::Value;
use tracing::trace;

use crate::algorithm::Algorithm;
use crate::base64url;
use crate::token::{self, Token};
use crate::Error;

/// Decode and verify a compact JWS string.
///
/// `key` is the verifying key (the raw HMAC secret, or a PEM-encoded
/// RSA/ECDSA public key). Pass `None` only when the header is expected to
/// declare `alg: none`; supplying a key for a `none` token is itself an
/// error, since an unsigned token has no key to check it against.
///
/// On any failure, no `Token` is returned — the token this function builds
/// internally is simply dropped, running the usual zero-wipe `Drop` path,
/// so there is nothing extra to do to honor "the partially constructed
/// token is destroyed before the error is surfaced."
pub fn decode(input: &str, key: Option<&[u8]>) -> Result<Token, Error> {
    trace!(len = input.len(), "decoding token");
    let segments: Vec<&str> = input.split('.').collect();
    let [h64, p64, s64] = match segments.as_slice() {
        [h, p, s] => [*h, *p, *s],
        _ => return Err(Error::Segmentation),
    };

    let header_object = parse_json_object(&base64url::decode(h64)?)?;

    let alg_name = header_object
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Invalid("header is missing `alg`".into()))?;
    let alg = Algorithm::from_str(alg_name)?;

    if alg.requires_key() {
        if let Some(typ) = header_object.get("typ").and_then(Value::as_str) {
            if !typ.eq_ignore_ascii_case("JWT") {
                return Err(Error::WrongType);
            }
        }
    }

    let supplied_key = match (alg.requires_key(), key) {
        (true, Some(bytes)) if !bytes.is_empty() => Some(bytes.to_vec()),
        (true, Some(_)) => return Err(Error::KeyRequired(alg)),
        (true, None) => None,
        (false, None) => None,
        (false, Some(_)) => return Err(Error::KeyNotAllowed),
    };

    let grants_object = parse_json_object(&base64url::decode(p64)?)?;

    if alg.requires_key() {
        let key_bytes = supplied_key
            .as_deref()
            .ok_or(Error::KeyRequired(alg))?;

        let mut signing_input = String::with_capacity(h64.len() + p64.len() + 1);
        signing_input.push_str(h64);
        signing_input.push('.');
        signing_input.push_str(p64);

        let signature = base64url::decode(s64)?;
        token::verify(alg, key_bytes, signing_input.as_bytes(), &signature)?;
    }

    trace!(alg = %alg, "decoded token");
    Ok(Token::from_parts(alg, supplied_key, header_object, grants_object))
}

fn parse_json_object(bytes: &[u8]) -> Result<crate::json::JsonObject, Error> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(object) => Ok(object),
        _ => Err(Error::Invalid("expected a JSON object".into())),
    }
}
