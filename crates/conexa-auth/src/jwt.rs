//! Unverified JWT expiry decoding
//!
//! Only the `exp` claim is read, and the signature is never checked: this
//! decides whether to refresh before a call, the server still validates.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// Expiry instant from the token's `exp` claim, if it can be decoded.
pub fn expires_at(token: &str) -> Option<SystemTime> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    let secs = exp
        .as_u64()
        .or_else(|| exp.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))?;
    UNIX_EPOCH.checked_add(Duration::from_secs(secs))
}

/// True unless the expiry is strictly after `now`. Undecodable tokens count
/// as expired.
pub fn is_expired_at(token: &str, now: SystemTime) -> bool {
    expires_at(token).is_none_or(|exp| exp <= now)
}
