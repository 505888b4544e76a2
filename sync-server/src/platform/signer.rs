//! One-legged OAuth request signing for the storefront REST API
//!
//! The storefront authenticates HTTP requests with a query-string signature:
//! every request carries `oauth_consumer_key`, `oauth_timestamp`,
//! `oauth_nonce`, `oauth_signature_method`, `oauth_version` and an
//! `oauth_signature` computed as HMAC-SHA256 over a canonical base string.
//! Signing is pure computation so it can be tested with a pinned
//! timestamp/nonce.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::PlatformError;
use shared::util::{now_millis, random_hex};

const SIGNATURE_METHOD: &str = "HMAC-SHA256";
const OAUTH_VERSION: &str = "1.0";

/// The generated per-request authorization parameters
#[derive(Debug, Clone)]
pub struct AuthParams {
    pub timestamp: String,
    pub nonce: String,
}

impl AuthParams {
    /// Fresh parameters for a live request: Unix seconds + 32-hex-char nonce
    pub fn fresh() -> Self {
        Self {
            timestamp: (now_millis() / 1000).to_string(),
            nonce: random_hex(16),
        }
    }
}

/// RFC 3986 percent-encoding, the strict variant the signature base string
/// requires (space as %20, uppercase hex)
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Sign a request and return the complete parameter list, including
/// `oauth_signature`, ready to append as the query string
///
/// `params` are the caller's own query parameters (filters, pagination).
/// The URL must be bare: callers pass query parameters through `params` so
/// they participate in the canonical string exactly once.
pub fn sign(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_key: &str,
    consumer_secret: &str,
    auth: &AuthParams,
) -> Result<Vec<(String, String)>, PlatformError> {
    if method.is_empty() {
        return Err(PlatformError::Signing("empty HTTP method".into()));
    }
    if url.contains('?') {
        return Err(PlatformError::Signing(format!(
            "url must not carry a query string: {url}"
        )));
    }

    let mut all: Vec<(String, String)> = params.to_vec();
    all.push(("oauth_consumer_key".into(), consumer_key.to_string()));
    all.push(("oauth_timestamp".into(), auth.timestamp.clone()));
    all.push(("oauth_nonce".into(), auth.nonce.clone()));
    all.push(("oauth_signature_method".into(), SIGNATURE_METHOD.into()));
    all.push(("oauth_version".into(), OAUTH_VERSION.into()));

    // Canonicalize: percent-encode both sides, sort by encoded key
    let mut encoded: Vec<(String, String)> = all
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    );

    let signing_key = format!("{}&", encode(consumer_secret));
    let mut mac = Hmac::<Sha256>::new_from_slice(signing_key.as_bytes())
        .map_err(|e| PlatformError::Signing(e.to_string()))?;
    mac.update(base_string.as_bytes());
    let signature = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    all.push(("oauth_signature".into(), signature));
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned() -> AuthParams {
        AuthParams {
            timestamp: "1700000000".into(),
            nonce: "abcdef0123456789abcdef0123456789".into(),
        }
    }

    #[test]
    fn test_signature_deterministic() {
        let params = vec![("status".to_string(), "processing".to_string())];
        let a = sign(
            "GET",
            "https://shop.example.com/wp-json/wc/v3/orders",
            &params,
            "ck_test",
            "cs_test",
            &pinned(),
        )
        .unwrap();
        let b = sign(
            "GET",
            "https://shop.example.com/wp-json/wc/v3/orders",
            &params,
            "ck_test",
            "cs_test",
            &pinned(),
        )
        .unwrap();

        let sig = |v: &[(String, String)]| {
            v.iter()
                .find(|(k, _)| k == "oauth_signature")
                .map(|(_, s)| s.clone())
                .unwrap()
        };
        assert_eq!(sig(&a), sig(&b));
    }

    #[test]
    fn test_signature_sensitive_to_inputs() {
        let params = vec![("page".to_string(), "1".to_string())];
        let base = sign(
            "GET",
            "https://shop.example.com/wp-json/wc/v3/orders",
            &params,
            "ck_test",
            "cs_test",
            &pinned(),
        )
        .unwrap();
        let other_method = sign(
            "PUT",
            "https://shop.example.com/wp-json/wc/v3/orders",
            &params,
            "ck_test",
            "cs_test",
            &pinned(),
        )
        .unwrap();
        let other_secret = sign(
            "GET",
            "https://shop.example.com/wp-json/wc/v3/orders",
            &params,
            "ck_test",
            "cs_other",
            &pinned(),
        )
        .unwrap();

        let sig = |v: &[(String, String)]| {
            v.iter()
                .find(|(k, _)| k == "oauth_signature")
                .map(|(_, s)| s.clone())
                .unwrap()
        };
        assert_ne!(sig(&base), sig(&other_method));
        assert_ne!(sig(&base), sig(&other_secret));
    }

    #[test]
    fn test_all_auth_params_present() {
        let signed = sign(
            "GET",
            "https://shop.example.com/wp-json/wc/v3/products",
            &[],
            "ck_test",
            "cs_test",
            &pinned(),
        )
        .unwrap();
        for key in [
            "oauth_consumer_key",
            "oauth_timestamp",
            "oauth_nonce",
            "oauth_signature_method",
            "oauth_version",
            "oauth_signature",
        ] {
            assert!(signed.iter().any(|(k, _)| k == key), "missing {key}");
        }
    }

    #[test]
    fn test_rejects_url_with_query() {
        let err = sign(
            "GET",
            "https://shop.example.com/wp-json/wc/v3/orders?page=1",
            &[],
            "ck_test",
            "cs_test",
            &pinned(),
        );
        assert!(matches!(err, Err(PlatformError::Signing(_))));
    }

    #[test]
    fn test_rejects_empty_method() {
        let err = sign(
            "",
            "https://shop.example.com/wp-json/wc/v3/orders",
            &[],
            "ck_test",
            "cs_test",
            &pinned(),
        );
        assert!(matches!(err, Err(PlatformError::Signing(_))));
    }

    #[test]
    fn test_fresh_nonce_unique() {
        assert_ne!(AuthParams::fresh().nonce, AuthParams::fresh().nonce);
    }
}
