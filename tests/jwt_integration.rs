//! Black-box integration tests: exercise the crate purely through its public
//! surface, covering the RFC 7519 appendix vector and the round-trip /
//! tamper-detection properties from the design doc across every algorithm
//! family (HMAC, RSA, ECDSA).

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use jwt_core::{Algorithm, Error, Token, Validator};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn none_alg_empty_token_matches_known_vector() {
    let mut token = Token::new();
    token.set_alg(Algorithm::None, None).unwrap();
    assert_eq!(token.encode().unwrap(), "eyJhbGciOiJub25lIn0.e30.");
}

#[test]
fn hs256_round_trip_recovers_claims() {
    init_tracing();
    let mut token = Token::new();
    token.set_alg(Algorithm::Hs256, Some(b"secret")).unwrap();
    token.add_grant_str("sub", "1234567890").unwrap();
    token.add_grant_str("name", "John Doe").unwrap();
    token.add_grant_int("iat", 1_516_239_022).unwrap();
    let compact = token.encode().unwrap();

    let decoded = Token::decode(&compact, Some(b"secret")).unwrap();
    assert_eq!(decoded.grant_str("sub"), Some("1234567890"));
    assert_eq!(decoded.grant_str("name"), Some("John Doe"));
    assert_eq!(decoded.grant_int("iat"), Some(1_516_239_022));
}

#[test]
fn tampering_any_segment_is_rejected_for_every_hmac_width() {
    for alg in [Algorithm::Hs256, Algorithm::Hs384, Algorithm::Hs512] {
        let mut token = Token::new();
        token.set_alg(alg, Some(b"correct-horse-battery-staple")).unwrap();
        token.add_grant_str("sub", "alice").unwrap();
        let compact = token.encode().unwrap();

        for segment_index in 0..3 {
            let mut parts: Vec<String> = compact.split('.').map(str::to_owned).collect();
            if parts[segment_index].is_empty() {
                continue;
            }
            let mut chars: Vec<char> = parts[segment_index].chars().collect();
            let i = 0;
            chars[i] = if chars[i] == 'a' { 'b' } else { 'a' };
            parts[segment_index] = chars.into_iter().collect();
            let tampered = parts.join(".");

            assert!(
                Token::decode(&tampered, Some(b"correct-horse-battery-staple")).is_err(),
                "{alg}: tampering segment {segment_index} should be rejected"
            );
        }
    }
}

fn rsa_key_pair(bits: usize) -> (String, String) {
    let private_key = RsaPrivateKey::new(&mut OsRng, bits).unwrap();
    let public_key = RsaPublicKey::from(&private_key);
    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .unwrap()
        .to_string();
    let public_pem = public_key.to_public_key_pem(LineEnding::LF).unwrap();
    (private_pem, public_pem)
}

#[test]
fn rs256_round_trip_with_generated_key_pair() {
    let (private_pem, public_pem) = rsa_key_pair(2048);

    let mut token = Token::new();
    token
        .set_alg(Algorithm::Rs256, Some(private_pem.as_bytes()))
        .unwrap();
    token.add_grant_str("sub", "alice").unwrap();
    let compact = token.encode().unwrap();

    let decoded = Token::decode(&compact, Some(public_pem.as_bytes())).unwrap();
    assert_eq!(decoded.alg(), Algorithm::Rs256);
    assert_eq!(decoded.grant_str("sub"), Some("alice"));

    // Wrong public key must not verify.
    let (_, other_public_pem) = rsa_key_pair(2048);
    assert!(Token::decode(&compact, Some(other_public_pem.as_bytes())).is_err());
}

fn p256_key_pair() -> (String, String) {
    use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    let secret = p256::SecretKey::random(&mut OsRng);
    let public = secret.public_key();
    (
        secret.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
        public.to_public_key_pem(LineEnding::LF).unwrap(),
    )
}

#[test]
fn es256_round_trip_with_generated_key_pair() {
    let (private_pem, public_pem) = p256_key_pair();

    let mut token = Token::new();
    token
        .set_alg(Algorithm::Es256, Some(private_pem.as_bytes()))
        .unwrap();
    token.add_grant_str("sub", "bob").unwrap();
    let compact = token.encode().unwrap();

    let decoded = Token::decode(&compact, Some(public_pem.as_bytes())).unwrap();
    assert_eq!(decoded.alg(), Algorithm::Es256);
    assert_eq!(decoded.grant_str("sub"), Some("bob"));
}

#[test]
fn validator_reports_algorithm_lock_for_cross_family_mismatch() {
    let mut token = Token::new();
    token.set_alg(Algorithm::Hs256, Some(b"secret")).unwrap();
    let compact = token.encode().unwrap();
    let decoded = Token::decode(&compact, Some(b"secret")).unwrap();

    let validator = Validator::new(Algorithm::Rs256);
    let err = validator.validate(&decoded).unwrap_err();
    assert_matches::assert_matches!(err, Error::Invalid(ref msg) if msg == "Algorithm does not match");
}

#[test]
fn exp_and_nbf_checks_compose_with_required_grants() {
    let mut token = Token::new();
    token.set_alg(Algorithm::Hs256, Some(b"secret")).unwrap();
    token.add_grant_int("exp", 2_000).unwrap();
    token.add_grant_int("nbf", 500).unwrap();
    token.add_grant_str("role", "admin").unwrap();

    let validator = Validator::new(Algorithm::Hs256)
        .with_now(1_000)
        .require_grant("role", serde_json::json!("admin"));
    validator.validate(&token).unwrap();
    assert_eq!(validator.status(), "Valid JWT");

    let expired = Validator::new(Algorithm::Hs256).with_now(2_500);
    let err = expired.validate(&token).unwrap_err();
    assert_eq!(err.to_string(), "JWT has expired");
}

#[test]
fn dup_produces_an_independently_mutable_copy() {
    let mut token = Token::new();
    token.set_alg(Algorithm::Hs256, Some(b"secret")).unwrap();
    token.add_grant_str("sub", "alice").unwrap();

    let mut copy = token.dup();
    copy.add_grant_str("extra", "value").unwrap();

    assert!(token.grant_str("extra").is_none());
    assert_eq!(copy.grant_str("sub"), Some("alice"));
}
