use chrono::{DateTime, Utc};
use data_encoding::HEXLOWER;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNING_ALGORITHM: &str = "HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-content-sha256;x-date";

/// Headers that have to accompany a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    pub x_date: String,
    pub content_sha256: String,
    pub authorization: String,
}

/// Signs OpenAPI requests with the HMAC-SHA256 scheme scoped to a region and service
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    region: String,
    service: String,
}

impl RequestSigner {
    pub fn new(credentials: Credentials, region: &str, service: &str) -> Self {
        Self {
            credentials,
            region: region.to_owned(),
            service: service.to_owned(),
        }
    }

    pub fn sign(
        &self,
        method: &str,
        host: &str,
        canonical_query: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> RequestSignature {
        let x_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let short_date = &x_date[..8];
        let content_sha256 = hex_sha256(body);

        let canonical_request = [
            method,
            "/",
            canonical_query,
            format!("host:{host}\nx-content-sha256:{content_sha256}\nx-date:{x_date}\n").as_str(),
            SIGNED_HEADERS,
            content_sha256.as_str(),
        ]
        .join("\n");

        let credential_scope = format!("{short_date}/{}/{}/request", self.region, self.service);
        let string_to_sign = [
            SIGNING_ALGORITHM,
            x_date.as_str(),
            credential_scope.as_str(),
            hex_sha256(canonical_request.as_bytes()).as_str(),
        ]
        .join("\n");

        let signing_key = [self.region.as_str(), self.service.as_str(), "request"]
            .into_iter()
            .fold(
                hmac_sha256(self.credentials.secret_key.as_bytes(), short_date),
                |key, scope| hmac_sha256(&key, scope),
            );
        let signature = HEXLOWER.encode(&hmac_sha256(&signing_key, &string_to_sign));

        RequestSignature {
            authorization: format!(
                "{SIGNING_ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                self.credentials.access_key
            ),
            x_date,
            content_sha256,
        }
    }
}

/// Sorted, RFC 3986 encoded query string; the same string is sent and signed.
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut encoded = params
        .iter()
        .map(|(key, value)| (encode(key), encode(value)))
        .collect::<Vec<_>>();

    encoded.sort();

    encoded
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

fn hmac_sha256(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());

    mac.finalize().into_bytes().to_vec()
}

fn hex_sha256(data: &[u8]) -> String {
    HEXLOWER.encode(&Sha256::digest(data))
}
