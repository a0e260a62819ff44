//! TC3-HMAC-SHA256 request signing

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm name
pub(crate) const ALGORITHM: &str = "TC3-HMAC-SHA256";

/// Headers covered by the signature
const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Content type sent with, and signed into, every request
pub(crate) const CONTENT_TYPE: &str = "application/json; charset=utf-8";

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Credentials plus the endpoint they sign for
pub(crate) struct Signer<'a> {
    pub secret_id: &'a str,
    pub secret_key: &'a str,
    pub host: &'a str,
    pub service: &'a str,
}

impl Signer<'_> {
    /// Authorization header value for a POST of `payload` to `/`
    pub(crate) fn authorization(&self, action: &str, payload: &str, timestamp: i64) -> String {
        let date = DateTime::from_timestamp(timestamp, 0)
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d")
            .to_string();

        let canonical_headers = format!(
            "content-type:{}\nhost:{}\nx-tc-action:{}\n",
            CONTENT_TYPE,
            self.host,
            action.to_lowercase()
        );
        let hashed_payload = hex::encode(Sha256::digest(payload.as_bytes()));
        let canonical_request =
            format!("POST\n/\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{hashed_payload}");

        let credential_scope = format!("{date}/{}/tc3_request", self.service);
        let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign =
            format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{hashed_canonical_request}");

        let secret_date = hmac_sha256(format!("TC3{}", self.secret_key).as_bytes(), date.as_bytes());
        let secret_service = hmac_sha256(&secret_date, self.service.as_bytes());
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
        let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.secret_id, credential_scope, SIGNED_HEADERS, signature
        )
    }
}
