//! A compact [JSON Web Token (JWT)][jwt] codec and verifier for the JWS
//! Compact Serialization defined by [RFC 7519]/[RFC 7515].
//!
//! # Design choices
//!
//! - The fixed algorithm set (`none`, `HS*`, `RS*`, `ES*`) is modeled as a
//!   closed [`Algorithm`] enum rather than an open-ended string, so a
//!   [`Token`] can never be carrying an algorithm this crate doesn't know how
//!   to sign or verify (see [`algorithm`]).
//! - [`Token`] owns its key material directly rather than behind a trait
//!   object; the key is wiped with [`zeroize`] on every path that discards
//!   it — `set_alg`, `dup`, and `Drop` alike.
//! - Encoding and decoding are free functions over `&Token` / `&str` rather
//!   than methods that mutate the token as a side effect: [`Token::encode`]
//!   builds a scratch header with canonical `alg`/`typ` injected and leaves
//!   the caller's own header object untouched.
//! - Policy (expiry, required grants, replicated-claim consistency) is
//!   deliberately kept out of decoding; it lives in [`Validator`], which is
//!   built and applied separately so a caller can decode an "untrusted"
//!   token, inspect it, and only then decide what policy it must satisfy.
//!
//! # Supported algorithms
//!
//! | Algorithm(s) | Family | Notes |
//! |--------------|--------|-------|
//! | `none` | - | Unsecured; signature segment is always empty |
//! | `HS256`, `HS384`, `HS512` | HMAC | Raw shared-secret key |
//! | `RS256`, `RS384`, `RS512` | RSA PKCS1v1.5 | PEM-encoded key |
//! | `ES256`, `ES384`, `ES512` | ECDSA (P-256/384/521) | PEM-encoded key, raw `r\|\|s` signature |
//!
//! JWE (encrypted tokens), the non-compact JWS JSON Serialization, JWK
//! parsing, and key rotation are out of scope for this crate.
//!
//! [jwt]: https://jwt.io/
//! [RFC 7519]: https://tools.ietf.org/html/rfc7519
//! [RFC 7515]: https://tools.ietf.org/html/rfc7515
//!
//! # Examples
//!
//! ```
//! use jwt_core::{Algorithm, Token, Validator};
//!
//! // Build and sign a token.
//! let mut token = Token::new();
//! token.set_alg(Algorithm::Hs256, Some(b"super-secret-key")).unwrap();
//! token.add_grant_str("sub", "alice").unwrap();
//! let compact = token.encode().unwrap();
//!
//! // Decode and verify it.
//! let decoded = Token::decode(&compact, Some(b"super-secret-key")).unwrap();
//! assert_eq!(decoded.grant_str("sub"), Some("alice"));
//!
//! // Apply policy on top of the decoded token.
//! let validator = Validator::new(Algorithm::Hs256);
//! validator.validate(&decoded).unwrap();
//! assert_eq!(validator.status(), "Valid JWT");
//! ```

#![deny(missing_debug_implementations, missing_docs)]

pub mod algorithm;
mod base64url;
mod crypto;
mod decode;
mod encode;
mod error;
mod json;
mod token;
mod validator;

pub use crate::algorithm::Algorithm;
pub use crate::error::{Error, ErrorKind};
pub use crate::json::JsonObject;
pub use crate::token::Token;
pub use crate::validator::Validator;

/// Re-exports for glob-importing the crate's everyday surface.
pub mod prelude {
    pub use crate::{Algorithm, Error, ErrorKind, Token, Validator};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc7519_appendix_a1_example_decodes() {
        // https://tools.ietf.org/html/rfc7519#section-3.1
        let token_string = "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.\
            eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFt\
            cGxlLmNvbS9pc19yb290Ijp0cnVlfQ.\
            dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let key = base64url::decode(
            "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow",
        )
        .unwrap();

        let token = Token::decode(token_string, Some(&key)).unwrap();
        assert_eq!(token.alg(), Algorithm::Hs256);
        assert_eq!(token.grant_str("iss"), Some("joe"));
        assert_eq!(token.grant_int("exp"), Some(1_300_819_380));
        assert_eq!(token.grant_bool("http://example.com/is_root"), Some(true));
    }

    #[test]
    fn encode_then_decode_round_trips_for_hs256() {
        let mut token = Token::new();
        token.set_alg(Algorithm::Hs256, Some(b"secret")).unwrap();
        token.add_grant_str("sub", "1234567890").unwrap();
        token.add_grant_str("name", "John Doe").unwrap();
        token.add_grant_int("iat", 1_516_239_022).unwrap();

        let compact = token.encode().unwrap();
        let decoded = Token::decode(&compact, Some(b"secret")).unwrap();

        assert_eq!(decoded.alg(), Algorithm::Hs256);
        assert_eq!(decoded.grant_str("sub"), Some("1234567890"));
        assert_eq!(decoded.grant_str("name"), Some("John Doe"));
        assert_eq!(decoded.grant_int("iat"), Some(1_516_239_022));
    }

    #[test]
    fn decode_rejects_algorithm_mismatch_at_validation() {
        let mut token = Token::new();
        token.set_alg(Algorithm::Hs256, Some(b"secret")).unwrap();
        let compact = token.encode().unwrap();
        let decoded = Token::decode(&compact, Some(b"secret")).unwrap();

        let validator = Validator::new(Algorithm::Rs256);
        let err = validator.validate(&decoded).unwrap_err();
        assert_eq!(err.to_string(), "Algorithm does not match");
    }
}
