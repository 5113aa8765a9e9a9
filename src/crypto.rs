//! Sign/verify dispatch for the fixed algorithm set.
//!
//! Each arm of [`sign`]/[`verify`] is a thin call into the RustCrypto crate
//! that owns the relevant primitive; none of the cryptography itself is
//! reimplemented here. HMAC keys are the raw shared secret; RSA and ECDSA
//! keys are PEM-encoded (PKCS#8 first, falling back to the family's native
//! PKCS#1 / SEC1 form), matching how every other JWT implementation in this
//! ecosystem accepts asymmetric keys.

use hmac::{Hmac, Mac};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use signature::{Signer, Verifier};

use crate::algorithm::{
    Algorithm, Family, ES256_SIGNATURE_LEN, ES384_SIGNATURE_LEN, ES512_SIGNATURE_LEN,
};
use crate::error::Error;

/// Sign `message` (the `H64 "." P64` signing input) under `alg` with `key`.
///
/// Returns an empty signature for [`Algorithm::None`], matching the wire
/// format's empty third segment.
pub fn sign(alg: Algorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
    match alg.family() {
        Family::None => Ok(Vec::new()),
        Family::Hmac => hmac_sign(alg, key, message),
        Family::Rsa => rsa_sign(alg, key, message),
        Family::Ecdsa => ecdsa_sign(alg, key, message),
    }
}

/// Verify that `signature` is a valid signature of `message` under `alg`
/// and `key`. HMAC verification uses the `hmac` crate's constant-time
/// comparison; RSA and ECDSA verification is whatever their crates provide,
/// which is not secret-dependent on the signature bytes to begin with.
pub fn verify(alg: Algorithm, key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), Error> {
    match alg.family() {
        Family::None => Ok(()),
        Family::Hmac => hmac_verify(alg, key, message, signature),
        Family::Rsa => rsa_verify(alg, key, message, signature),
        Family::Ecdsa => ecdsa_verify(alg, key, message, signature),
    }
}

fn hmac_sign(alg: Algorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
    macro_rules! mac {
        ($digest:ty) => {{
            let mut mac =
                Hmac::<$digest>::new_from_slice(key).map_err(|_| Error::MalformedKey)?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }};
    }
    match alg {
        Algorithm::Hs256 => mac!(Sha256),
        Algorithm::Hs384 => mac!(Sha384),
        Algorithm::Hs512 => mac!(Sha512),
        _ => unreachable!("hmac_sign called with non-HMAC algorithm"),
    }
}

fn hmac_verify(alg: Algorithm, key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), Error> {
    macro_rules! mac {
        ($digest:ty) => {{
            let mut mac =
                Hmac::<$digest>::new_from_slice(key).map_err(|_| Error::MalformedKey)?;
            mac.update(message);
            mac.verify_slice(signature)
                .map_err(|_| Error::SignatureMismatch)
        }};
    }
    match alg {
        Algorithm::Hs256 => mac!(Sha256),
        Algorithm::Hs384 => mac!(Sha384),
        Algorithm::Hs512 => mac!(Sha512),
        _ => unreachable!("hmac_verify called with non-HMAC algorithm"),
    }
}

fn rsa_private_key(pem: &[u8]) -> Result<RsaPrivateKey, Error> {
    let pem = std::str::from_utf8(pem).map_err(|_| Error::MalformedKey)?;
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|_| Error::MalformedKey)
}

fn rsa_public_key(pem: &[u8]) -> Result<RsaPublicKey, Error> {
    let pem = std::str::from_utf8(pem).map_err(|_| Error::MalformedKey)?;
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|_| Error::MalformedKey)
}

fn rsa_sign(alg: Algorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
    let private_key = rsa_private_key(key)?;
    macro_rules! sign_with {
        ($digest:ty) => {{
            let signing_key = rsa::pkcs1v15::SigningKey::<$digest>::new(private_key);
            let signature = signing_key
                .try_sign(message)
                .map_err(|_| Error::MalformedKey)?;
            Ok(signature.to_vec())
        }};
    }
    match alg {
        Algorithm::Rs256 => sign_with!(Sha256),
        Algorithm::Rs384 => sign_with!(Sha384),
        Algorithm::Rs512 => sign_with!(Sha512),
        _ => unreachable!("rsa_sign called with non-RSA algorithm"),
    }
}

fn rsa_verify(alg: Algorithm, key: &[u8], message: &[u8], raw_signature: &[u8]) -> Result<(), Error> {
    let public_key = rsa_public_key(key)?;
    macro_rules! verify_with {
        ($digest:ty) => {{
            let verifying_key = rsa::pkcs1v15::VerifyingKey::<$digest>::new(public_key);
            let signature = rsa::pkcs1v15::Signature::try_from(raw_signature)
                .map_err(|_| Error::SignatureMismatch)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| Error::SignatureMismatch)
        }};
    }
    match alg {
        Algorithm::Rs256 => verify_with!(Sha256),
        Algorithm::Rs384 => verify_with!(Sha384),
        Algorithm::Rs512 => verify_with!(Sha512),
        _ => unreachable!("rsa_verify called with non-RSA algorithm"),
    }
}

fn ecdsa_sign(alg: Algorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
    let pem = std::str::from_utf8(key).map_err(|_| Error::MalformedKey)?;
    match alg {
        Algorithm::Es256 => {
            let secret = p256::SecretKey::from_pkcs8_pem(pem)
                .or_else(|_| p256::SecretKey::from_sec1_pem(pem))
                .map_err(|_| Error::MalformedKey)?;
            let signing_key = p256::ecdsa::SigningKey::from(secret);
            let signature: p256::ecdsa::Signature = signing_key
                .try_sign(message)
                .map_err(|_| Error::MalformedKey)?;
            let raw = signature.to_bytes().to_vec();
            debug_assert_eq!(raw.len(), ES256_SIGNATURE_LEN);
            Ok(raw)
        }
        Algorithm::Es384 => {
            let secret = p384::SecretKey::from_pkcs8_pem(pem)
                .or_else(|_| p384::SecretKey::from_sec1_pem(pem))
                .map_err(|_| Error::MalformedKey)?;
            let signing_key = p384::ecdsa::SigningKey::from(secret);
            let signature: p384::ecdsa::Signature = signing_key
                .try_sign(message)
                .map_err(|_| Error::MalformedKey)?;
            let raw = signature.to_bytes().to_vec();
            debug_assert_eq!(raw.len(), ES384_SIGNATURE_LEN);
            Ok(raw)
        }
        Algorithm::Es512 => {
            let secret = p521::SecretKey::from_pkcs8_pem(pem)
                .or_else(|_| p521::SecretKey::from_sec1_pem(pem))
                .map_err(|_| Error::MalformedKey)?;
            let signing_key = p521::ecdsa::SigningKey::from(secret);
            let signature: p521::ecdsa::Signature = signing_key
                .try_sign(message)
                .map_err(|_| Error::MalformedKey)?;
            let raw = signature.to_bytes().to_vec();
            debug_assert_eq!(raw.len(), ES512_SIGNATURE_LEN);
            Ok(raw)
        }
        _ => unreachable!("ecdsa_sign called with non-ECDSA algorithm"),
    }
}

/// Reject a signature whose length doesn't match the curve's fixed `r||s`
/// width before ever handing it to the `p256`/`p384`/`p521` parser. The
/// parsers already reject the wrong length on their own, but checking the
/// width explicitly against the per-curve constants makes the fixed-width
/// `r||s` encoding (as opposed to DER) a visible part of this function
/// rather than an incidental side effect of the downstream crate.
fn check_ecdsa_signature_len(raw_signature: &[u8], expected: usize) -> Result<(), Error> {
    if raw_signature.len() != expected {
        return Err(Error::SignatureMismatch);
    }
    Ok(())
}

fn ecdsa_verify(alg: Algorithm, key: &[u8], message: &[u8], raw_signature: &[u8]) -> Result<(), Error> {
    let pem = std::str::from_utf8(key).map_err(|_| Error::MalformedKey)?;
    match alg {
        Algorithm::Es256 => {
            check_ecdsa_signature_len(raw_signature, ES256_SIGNATURE_LEN)?;
            let public = p256::PublicKey::from_public_key_pem(pem)
                .or_else(|_| p256::PublicKey::from_sec1_bytes(pem.as_bytes()))
                .map_err(|_| Error::MalformedKey)?;
            let verifying_key = p256::ecdsa::VerifyingKey::from(public);
            let signature = p256::ecdsa::Signature::from_slice(raw_signature)
                .map_err(|_| Error::SignatureMismatch)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| Error::SignatureMismatch)
        }
        Algorithm::Es384 => {
            check_ecdsa_signature_len(raw_signature, ES384_SIGNATURE_LEN)?;
            let public = p384::PublicKey::from_public_key_pem(pem)
                .or_else(|_| p384::PublicKey::from_sec1_bytes(pem.as_bytes()))
                .map_err(|_| Error::MalformedKey)?;
            let verifying_key = p384::ecdsa::VerifyingKey::from(public);
            let signature = p384::ecdsa::Signature::from_slice(raw_signature)
                .map_err(|_| Error::SignatureMismatch)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| Error::SignatureMismatch)
        }
        Algorithm::Es512 => {
            check_ecdsa_signature_len(raw_signature, ES512_SIGNATURE_LEN)?;
            let public = p521::PublicKey::from_public_key_pem(pem)
                .or_else(|_| p521::PublicKey::from_sec1_bytes(pem.as_bytes()))
                .map_err(|_| Error::MalformedKey)?;
            let verifying_key = p521::ecdsa::VerifyingKey::from(public);
            let signature = p521::ecdsa::Signature::from_slice(raw_signature)
                .map_err(|_| Error::SignatureMismatch)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| Error::SignatureMismatch)
        }
        _ => unreachable!("ecdsa_verify called with non-ECDSA algorithm"),
    }
}
