//! HMAC request signing for the nucleo message endpoint.
//!
//! The vendor contract: `HMAC-SHA256(secret, "{lowercase serial}\n{date}\n{body}")`
//! hex-encoded, sent as `Authorization: NEATOAPP <digest>` together with
//! the same date in an `X-Date` header.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Formats a timestamp as the RFC-1123 date the signature covers,
/// e.g. `Mon, 24 Aug 2026 12:00:00 GMT`.
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Computes the hex signature over serial, date and request body.
pub fn sign(serial: &str, secret: &str, date: &str, body: &str) -> String {
    let key = format!("{}\n{}\n{}", serial.to_lowercase(), date, body);

    // HMAC accepts keys of any length; new_from_slice cannot fail for SHA-256.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts any key length"));
    mac.update(key.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
