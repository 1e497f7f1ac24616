//! HMAC-SHA256 request signing for the Volcengine OpenAPI.
//!
//! The scheme follows the SigV4 family: a canonical request is hashed, folded
//! into a string to sign together with the timestamp and credential scope, and
//! signed with a key derived by chaining HMACs over date, region, and service.
//! Unlike SigV4 the secret is used as-is (no prefix) and the scope terminator
//! is `request`.
//!
//! Everything here is pure so the whole procedure can be checked against
//! fixed vectors.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HMAC-SHA256";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const SCOPE_TERMINATOR: &str = "request";

/// Headers covered by the signature, in the order they are canonicalized.
pub const SIGNED_HEADERS: [&str; 4] = ["host", "x-date", "x-content-sha256", "content-type"];

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn hmac_sha256(key: &[u8], content: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(content.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// `kSigning = HMAC(HMAC(HMAC(HMAC(secret, date), region), service), "request")`
pub fn derive_signing_key(secret: &str, short_date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(secret.as_bytes(), short_date);
    let k_region = hmac_sha256(&k_date, region);
    let k_service = hmac_sha256(&k_region, service);
    hmac_sha256(&k_service, SCOPE_TERMINATOR)
}

/// Percent-encodes everything outside `A-Z a-z 0-9 - _ . ~`.
pub fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Sorted, encoded `k=v&k=v` query string. Pairs with equal keys keep their value order.
pub fn canonical_query(pairs: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    encoded.sort_by(|a, b| a.0.cmp(&b.0));
    encoded
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn format_x_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

/// The parts of an HTTP request that the signature covers.
#[derive(Debug, Clone)]
pub struct RequestToSign<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a [(String, String)],
    pub body: &'a [u8],
}

/// Everything produced while signing. Only the header values go on the wire;
/// the intermediate strings are kept for debug logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub x_date: String,
    pub content_sha256: String,
    pub query_string: String,
    pub canonical_request: String,
    pub credential_scope: String,
    pub string_to_sign: String,
    pub signature: String,
    pub authorization: String,
}

impl SignedRequest {
    /// Headers to attach to the outgoing request.
    pub fn headers(&self) -> [(&'static str, &str); 4] {
        [
            ("X-Date", self.x_date.as_str()),
            ("X-Content-Sha256", self.content_sha256.as_str()),
            ("Content-Type", CONTENT_TYPE_JSON),
            ("Authorization", self.authorization.as_str()),
        ]
    }
}

#[derive(Clone)]
pub struct Signer {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    service: String,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}

impl Signer {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            service: service.into(),
        }
    }

    pub fn sign(&self, request: &RequestToSign<'_>, now: DateTime<Utc>) -> SignedRequest {
        let x_date = format_x_date(now);
        let short_date = &x_date[..8];
        let content_sha256 = sha256_hex(request.body);
        let query_string = canonical_query(request.query);

        let canonical_headers = SIGNED_HEADERS
            .iter()
            .map(|name| {
                let value = match *name {
                    "host" => request.host,
                    "x-date" => x_date.as_str(),
                    "x-content-sha256" => content_sha256.as_str(),
                    _ => CONTENT_TYPE_JSON,
                };
                format!("{}:{}", name, value.trim())
            })
            .collect::<Vec<_>>()
            .join("\n");
        let signed_headers = SIGNED_HEADERS.join(";");

        // The header block carries its own trailing newline, leaving a blank line before the list.
        let header_block = format!("{}\n", canonical_headers);
        let canonical_request = [
            request.method,
            request.path,
            query_string.as_str(),
            header_block.as_str(),
            signed_headers.as_str(),
            content_sha256.as_str(),
        ]
        .join("\n");

        let credential_scope = format!(
            "{}/{}/{}/{}",
            short_date, self.region, self.service, SCOPE_TERMINATOR
        );
        let hashed_canonical_request = sha256_hex(canonical_request.as_bytes());
        let string_to_sign = [
            ALGORITHM,
            x_date.as_str(),
            credential_scope.as_str(),
            hashed_canonical_request.as_str(),
        ]
        .join("\n");

        let signing_key =
            derive_signing_key(&self.secret_access_key, short_date, &self.region, &self.service);
        let signature = hex::encode(hmac_sha256(&signing_key, &string_to_sign));

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key_id, credential_scope, signed_headers, signature
        );

        SignedRequest {
            x_date,
            content_sha256,
            query_string,
            canonical_request,
            credential_scope,
            string_to_sign,
            signature,
            authorization,
        }
    }
}
