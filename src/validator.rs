//! Claims validator: applies policy to an already-decoded [`Token`] —
//! algorithm match, `exp`/`nbf` time checks, replicated-claim consistency,
//! and required grants.

use std::cell::RefCell;

use serde_json::Value;
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::error::Error;
use crate::json::{self, JsonObject};
use crate::token::Token;

/// A reusable policy against which tokens are checked.
///
/// `hdr` is accepted and stored but has no observable effect on
/// [`Validator::validate`] today; it is reserved for a future revision that
/// lets the caller pick whether replicated claims (`iss`/`sub`/`aud`) are
/// read from headers, grants, or either, instead of the current fixed
/// "present in both, must agree" rule.
#[derive(Debug, Clone)]
pub struct Validator {
    alg: Algorithm,
    now: i64,
    hdr: bool,
    req_grants: JsonObject,
    status: RefCell<String>,
}

/// Names of replicated claims checked for header/grant consistency.
const REPLICATED_STRING_CLAIMS: [&str; 2] = ["iss", "sub"];

impl Validator {
    /// Start a policy that requires tokens to be signed with `alg`.
    /// Time checks are disabled (`now = 0`) until [`Validator::with_now`]
    /// is called.
    pub fn new(alg: Algorithm) -> Self {
        Validator {
            alg,
            now: 0,
            hdr: false,
            req_grants: json::new_object(),
            status: RefCell::new(String::new()),
        }
    }

    /// Enable `exp`/`nbf` checks against `now` (Unix seconds). `now == 0`
    /// disables time checks; there is no valid token with a Unix timestamp
    /// of zero, so it doubles as an unambiguous "unset" sentinel.
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    /// Set the reserved header/grant claim-source selector. Stored, not
    /// yet acted on.
    pub fn with_hdr(mut self, hdr: bool) -> Self {
        self.hdr = hdr;
        self
    }

    /// Require grant `name` to be present and JSON-equal to `expected`.
    pub fn require_grant(mut self, name: impl Into<String>, expected: Value) -> Self {
        self.req_grants.insert(name.into(), expected);
        self
    }

    /// The status message set by the most recent [`Validator::validate`]
    /// call.
    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Check `token` against this policy.
    ///
    /// Checks run in a fixed order: algorithm, then time bounds, then
    /// replicated-claim consistency, then required grants. The first
    /// failure (other than the required-grants pass, which reports the
    /// first mismatching grant) short-circuits the rest. On success,
    /// returns `Ok(())` and sets the status to `"Valid JWT"`; on failure,
    /// returns `Err(Error::Invalid(status))` with the same message that
    /// [`Validator::status`] will report afterward.
    pub fn validate(&self, token: &Token) -> Result<(), Error> {
        if let Err(status) = self.check(token) {
            debug!(check = %status, "jwt validation rejected token");
            *self.status.borrow_mut() = status.clone();
            return Err(Error::Invalid(status));
        }
        *self.status.borrow_mut() = "Valid JWT".to_owned();
        Ok(())
    }

    fn check(&self, token: &Token) -> Result<(), String> {
        if self.alg != token.alg() {
            return Err("Algorithm does not match".to_owned());
        }

        if self.now != 0 {
            if let Some(exp) = token.grants().get("exp").and_then(Value::as_i64) {
                if self.now >= exp {
                    return Err("JWT has expired".to_owned());
                }
            }
            if let Some(nbf) = token.grants().get("nbf").and_then(Value::as_i64) {
                if self.now < nbf {
                    return Err("JWT has not matured".to_owned());
                }
            }
        }

        for name in REPLICATED_STRING_CLAIMS {
            if let (Some(header_value), Some(grant_value)) = (
                token.headers().get(name).and_then(Value::as_str),
                token.grants().get(name).and_then(Value::as_str),
            ) {
                if header_value != grant_value {
                    return Err(format!("JWT \"{name}\" header does not match"));
                }
            }
        }

        if let (Some(header_aud), Some(grant_aud)) =
            (token.headers().get("aud"), token.grants().get("aud"))
        {
            if header_aud != grant_aud {
                return Err("JWT \"aud\" header does not match".to_owned());
            }
        }

        for (name, expected) in &self.req_grants {
            match token.grants().get(name) {
                Some(actual) if actual == expected => {}
                Some(_) => return Err(format!("JWT \"{name}\" grant does not match")),
                None => return Err(format!("JWT \"{name}\" grant is not present")),
            }
        }

        Ok(())
    }
}
