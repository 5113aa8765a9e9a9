//! The closed set of JWS algorithms this crate speaks.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Raw signature width, in bytes, for each asymmetric family.
pub(crate) const ES256_SIGNATURE_LEN: usize = 64;
pub(crate) const ES384_SIGNATURE_LEN: usize = 96;
pub(crate) const ES512_SIGNATURE_LEN: usize = 132;

/// A JWS `alg` header value, restricted to the algorithms this crate
/// implements.
///
/// Parsing (`FromStr`) is case-insensitive; emission (`Display`, [`Algorithm::name`])
/// always produces the canonical form from the table in RFC 7518 §3.1, except
/// for `none`, which RFC 7519 and common practice render lowercase.
///
/// There is deliberately no `Invalid` variant: an unrecognized algorithm name
/// is a parse *failure* ([`Error::UnknownAlgorithm`]), never a storable
/// `Algorithm` value. A [`crate::Token`] can therefore never be holding an
/// invalid algorithm tag, which is a strictly safer rendition of the same
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Unsecured JWS; the signature segment is always empty.
    None,
    /// HMAC using SHA-256.
    Hs256,
    /// HMAC using SHA-384.
    Hs384,
    /// HMAC using SHA-512.
    Hs512,
    /// RSASSA-PKCS1-v1_5 using SHA-256.
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    Rs512,
    /// ECDSA using P-256 and SHA-256.
    Es256,
    /// ECDSA using P-384 and SHA-384.
    Es384,
    /// ECDSA using P-521 and SHA-512.
    Es512,
}

impl Algorithm {
    /// The canonical JWS algorithm name, as it appears in the `alg` header.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::None => "none",
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
            Algorithm::Rs256 => "RS256",
            Algorithm::Rs384 => "RS384",
            Algorithm::Rs512 => "RS512",
            Algorithm::Es256 => "ES256",
            Algorithm::Es384 => "ES384",
            Algorithm::Es512 => "ES512",
        }
    }

    /// Whether this algorithm requires a non-empty key on the token
    /// (everything except `none`).
    pub const fn requires_key(self) -> bool {
        !matches!(self, Algorithm::None)
    }

    pub(crate) const fn family(self) -> Family {
        match self {
            Algorithm::None => Family::None,
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => Family::Hmac,
            Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => Family::Rsa,
            Algorithm::Es256 | Algorithm::Es384 | Algorithm::Es512 => Family::Ecdsa,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    None,
    Hmac,
    Rsa,
    Ecdsa,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let alg = match upper.as_str() {
            "NONE" => Algorithm::None,
            "HS256" => Algorithm::Hs256,
            "HS384" => Algorithm::Hs384,
            "HS512" => Algorithm::Hs512,
            "RS256" => Algorithm::Rs256,
            "RS384" => Algorithm::Rs384,
            "RS512" => Algorithm::Rs512,
            "ES256" => Algorithm::Es256,
            "ES384" => Algorithm::Es384,
            "ES512" => Algorithm::Es512,
            _ => return Err(Error::UnknownAlgorithm(s.to_owned())),
        };
        Ok(alg)
    }
}
