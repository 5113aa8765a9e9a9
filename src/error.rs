//! Error taxonomy shared by every fallible operation in the crate.
//!
//! The concrete [`Error`] variants carry enough detail for a human (and for
//! `tracing`) to understand what went wrong; [`Error::kind`] collapses them
//! onto the four abstract kinds the rest of the crate reasons about.

use std::fmt;

/// The four kinds of failure a caller needs to branch on.
///
/// Distinct from [`Error`] itself: several `Error` variants map onto the
/// same `ErrorKind`, and the getter-style accessors on [`crate::Token`]
/// report failures as a bare `ErrorKind` rather than a full `Error` (see
/// `Token::last_error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input, an algorithm mismatch, a signature that doesn't
    /// verify, or an invariant the caller tried to violate.
    Invalid,
    /// A fallible allocation did not have enough memory to satisfy a
    /// reservation.
    NoMemory,
    /// The caller tried to add a header or grant name that is already
    /// present.
    Exists,
    /// An accessor could not find the requested name.
    NotPresent,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Invalid => "invalid",
            ErrorKind::NoMemory => "no memory",
            ErrorKind::Exists => "exists",
            ErrorKind::NotPresent => "not present",
        };
        f.write_str(s)
    }
}

/// Error returned by the fallible, constructor-style operations of this
/// crate (token construction, encode, decode, algorithm changes, ...).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token did not split into exactly three `.`-separated segments.
    #[error("token does not have the form header.payload.signature")]
    Segmentation,

    /// A segment was not valid unpadded base64url.
    #[error("malformed base64url segment")]
    Base64(#[from] base64::DecodeError),

    /// A header or payload segment did not decode to a JSON object, or a
    /// `*_json` blob the caller supplied was malformed.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The header's `alg` field named an algorithm this crate does not
    /// implement.
    #[error("unrecognized algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// The header carries a `typ` other than (case-insensitively) `"JWT"`.
    #[error("header `typ` is present but is not \"JWT\"")]
    WrongType,

    /// `alg != NONE` but no key (or an empty key) was supplied.
    #[error("algorithm {0} requires a non-empty key")]
    KeyRequired(crate::algorithm::Algorithm),

    /// `alg == NONE` but a key was supplied.
    #[error("algorithm `none` must not be given a key")]
    KeyNotAllowed,

    /// The key bytes could not be parsed into the key material the
    /// algorithm's family expects (e.g. not a valid PEM-encoded RSA key).
    #[error("key is malformed for this algorithm")]
    MalformedKey,

    /// Signature verification ran to completion and rejected the token.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// Reserving storage for a key buffer failed.
    #[error("failed to reserve memory for the key buffer")]
    NoMemory,

    /// `name` is already present in the target object.
    #[error("`{0}` is already present")]
    Exists(String),

    /// `name` is not present in the target object.
    #[error("`{0}` is not present")]
    NotPresent(String),

    /// Validator policy rejected the token; carries the human-readable
    /// status message described in the policy's `status` field.
    #[error("{0}")]
    Invalid(String),
}

impl Error {
    /// Collapse this error onto one of the four abstract kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Segmentation
            | Error::Base64(_)
            | Error::Json(_)
            | Error::UnknownAlgorithm(_)
            | Error::WrongType
            | Error::KeyRequired(_)
            | Error::KeyNotAllowed
            | Error::MalformedKey
            | Error::SignatureMismatch
            | Error::Invalid(_) => ErrorKind::Invalid,
            Error::NoMemory => ErrorKind::NoMemory,
            Error::Exists(_) => ErrorKind::Exists,
            Error::NotPresent(_) => ErrorKind::NotPresent,
        }
    }
}
