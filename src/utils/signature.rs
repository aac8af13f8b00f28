use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Stripe's default replay window.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`) against the
/// raw request body. Any one matching `v1` entry is accepted.
pub fn verify_stripe_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<()> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(v)) => timestamp = v.parse().ok(),
            (Some("v1"), Some(v)) => signatures.push(v),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| Error::InvalidSignature("missing_timestamp".into()))?;
    if signatures.is_empty() {
        return Err(Error::InvalidSignature("missing_v1_signature".into()));
    }
    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(Error::InvalidSignature("timestamp_outside_tolerance".into()));
    }

    let expected = sign(payload, timestamp, secret)?;
    let matched = signatures
        .iter()
        .any(|sig| bool::from(sig.as_bytes().ct_eq(expected.as_bytes())));
    if matched {
        Ok(())
    } else {
        Err(Error::InvalidSignature("signature_mismatch".into()))
    }
}

/// Hex HMAC-SHA256 of `"<timestamp>.<payload>"`.
pub fn sign(payload: &[u8], timestamp: i64, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Internal(format!("hmac key: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    fn header_for(ts: i64, body: &[u8]) -> String {
        format!("t={},v1={}", ts, sign(body, ts, SECRET).unwrap())
    }

    #[test]
    fn accepts_valid_signature() {
        let header = header_for(1_700_000_000, BODY);
        assert!(verify_stripe_signature(BODY, &header, SECRET, 1_700_000_010, 300).is_ok());
    }

    #[test]
    fn accepts_any_matching_v1_entry() {
        let good = sign(BODY, 1_700_000_000, SECRET).unwrap();
        let header = format!("t=1700000000,v1=deadbeef,v0=abc,v1={}", good);
        assert!(verify_stripe_signature(BODY, &header, SECRET, 1_700_000_000, 300).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let header = header_for(1_700_000_000, BODY);
        let tampered = br#"{"id":"evt_2","type":"checkout.session.completed"}"#;
        assert!(matches!(
            verify_stripe_signature(tampered, &header, SECRET, 1_700_000_000, 300),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn rejects_wrong_secret_and_stale_timestamp() {
        let header = header_for(1_700_000_000, BODY);
        assert!(verify_stripe_signature(BODY, &header, "whsec_other", 1_700_000_000, 300).is_err());
        assert!(verify_stripe_signature(BODY, &header, SECRET, 1_700_000_301, 300).is_err());
    }

    #[test]
    fn extreme_timestamps_are_stale_not_fatal() {
        for ts in [i64::MIN, i64::MAX] {
            let header = format!("t={},v1=00", ts);
            assert!(matches!(
                verify_stripe_signature(b"{}", &header, SECRET, 1_700_000_000, 300),
                Err(Error::InvalidSignature(_))
            ));
        }
        let header = header_for(i64::MAX, BODY);
        assert!(verify_stripe_signature(BODY, &header, SECRET, i64::MIN, 300).is_err());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(verify_stripe_signature(BODY, "", SECRET, 0, 300).is_err());
        assert!(verify_stripe_signature(BODY, "t=abc,v1=00", SECRET, 0, 300).is_err());
        assert!(verify_stripe_signature(BODY, "t=0", SECRET, 0, 300).is_err());
    }
}
