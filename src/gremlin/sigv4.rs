//! AWS Signature Version 4 signing for IAM-authenticated Neptune endpoints

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Service name Neptune expects in the credential scope
pub const NEPTUNE_SERVICE: &str = "neptune-db";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SigningError {
    #[error("missing credential {0}")]
    MissingCredential(&'static str),

    #[error("invalid signing key")]
    InvalidKey,
}

/// Static AWS credentials
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SigningError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key_id = lookup("AWS_ACCESS_KEY_ID")
            .filter(|v| !v.is_empty())
            .ok_or(SigningError::MissingCredential("AWS_ACCESS_KEY_ID"))?;
        let secret_access_key = lookup("AWS_SECRET_ACCESS_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(SigningError::MissingCredential("AWS_SECRET_ACCESS_KEY"))?;
        let session_token = lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty());
        Ok(Credentials {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }

    pub fn from_env() -> Result<Self, SigningError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Signs Gremlin HTTP requests for one region
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Self {
        SigV4Signer {
            credentials,
            region: region.into(),
            service: NEPTUNE_SERVICE.to_string(),
        }
    }

    /// Compute the headers to attach to a request with no query string.
    ///
    /// `host` must be the exact Host header value sent on the wire.
    pub fn sign(
        &self,
        method: &str,
        host: &str,
        path: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Vec<(&'static str, String)>, SigningError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut canonical_headers = format!("host:{}\nx-amz-date:{}\n", host.trim(), amz_date);
        let mut signed_headers = String::from("host;x-amz-date");
        if let Some(token) = &self.credentials.session_token {
            canonical_headers.push_str(&format!("x-amz-security-token:{}\n", token.trim()));
            signed_headers.push_str(";x-amz-security-token");
        }

        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method,
            path,
            canonical_headers,
            signed_headers,
            sha256_hex(body)
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let key = signing_key(
            &self.credentials.secret_access_key,
            &date,
            &self.region,
            &self.service,
        )?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        let mut headers = vec![
            (
                "authorization",
                format!(
                    "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                    ALGORITHM, self.credentials.access_key_id, scope, signed_headers, signature
                ),
            ),
            ("x-amz-date", amz_date),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token", token.clone()));
        }
        Ok(headers)
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derive the per-day signing key
pub(crate) fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn creds(token: Option<&str>) -> Credentials {
        Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: EXAMPLE_SECRET.to_string(),
            session_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_signing_key_matches_published_example() {
        let key = signing_key(EXAMPLE_SECRET, "20150830", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn test_signature_matches_published_example() {
        let key = signing_key(EXAMPLE_SECRET, "20150830", "us-east-1", "iam").unwrap();
        let string_to_sign = "AWS4-HMAC-SHA256\n20150830T123600Z\n20150830/us-east-1/iam/aws4_request\nf536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59";
        let sig = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()).unwrap());
        assert_eq!(
            sig,
            "5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn test_empty_payload_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sign_produces_neptune_headers() {
        let signer = SigV4Signer::new(creds(None), "us-west-2");
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let headers = signer
            .sign("POST", "db.cluster.neptune.amazonaws.com:8182", "/gremlin", b"{}", now)
            .unwrap();

        let auth = &headers.iter().find(|(k, _)| *k == "authorization").unwrap().1;
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240501/us-west-2/neptune-db/aws4_request, SignedHeaders=host;x-amz-date, Signature="
        ));
        let sig = auth.rsplit("Signature=").next().unwrap();
        assert_eq!(sig.len(), 64);

        let date = &headers.iter().find(|(k, _)| *k == "x-amz-date").unwrap().1;
        assert_eq!(date, "20240501T120000Z");

        // Deterministic for identical inputs
        let again = signer
            .sign("POST", "db.cluster.neptune.amazonaws.com:8182", "/gremlin", b"{}", now)
            .unwrap();
        assert_eq!(headers, again);
    }

    #[test]
    fn test_session_token_is_signed_and_sent() {
        let signer = SigV4Signer::new(creds(Some("tok")), "us-west-2");
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let headers = signer.sign("POST", "h:8182", "/gremlin", b"{}", now).unwrap();
        assert!(headers
            .iter()
            .any(|(k, v)| *k == "x-amz-security-token" && v == "tok"));
        assert!(headers[0].1.contains("SignedHeaders=host;x-amz-date;x-amz-security-token"));
    }

    #[test]
    fn test_credentials_from_lookup() {
        let ok = Credentials::from_lookup(|k| match k {
            "AWS_ACCESS_KEY_ID" => Some("id".to_string()),
            "AWS_SECRET_ACCESS_KEY" => Some("s3cr3t-value".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(ok.session_token, None);
        assert!(!format!("{:?}", ok).contains("s3cr3t-value"));

        let missing = Credentials::from_lookup(|_| None);
        assert_eq!(
            missing.unwrap_err(),
            SigningError::MissingCredential("AWS_ACCESS_KEY_ID")
        );
    }
}
