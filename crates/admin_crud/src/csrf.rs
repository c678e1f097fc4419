use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::request::AdminRequest;

pub const TOKEN_FIELD: &str = "_token";
pub const TOKEN_HEADER: &str = "x-csrf-token";
/// Secret used when none is configured. Deployments must override it.
pub const DEFAULT_CSRF_SECRET: &str = "change-me";

/// Checks the deletion token a request carries for one row.
pub trait CsrfValidator: Send + Sync {
    fn is_delete_token_valid(&self, row_identity: &str, request: &AdminRequest) -> bool;
}

/// Stateless tokens derived from a server secret and the row identity.
#[derive(Clone)]
pub struct DeleteTokenManager {
    secret: Vec<u8>,
}

impl DeleteTokenManager {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn delete_token(&self, row_identity: &str) -> String {
        self.digest(b"delete", row_identity.as_bytes())
    }

    /// `<payload>.<signature>`, for values that round-trip through the client.
    pub fn sign(&self, payload: &str) -> String {
        format!("{payload}.{}", self.digest(b"signed", payload.as_bytes()))
    }

    /// Payload of a value produced by [`sign`](Self::sign) with the same
    /// secret. `None` when the signature does not match.
    pub fn verify<'a>(&self, signed: &'a str) -> Option<&'a str> {
        let (payload, signature) = signed.rsplit_once('.')?;
        let expected = self.digest(b"signed", payload.as_bytes());
        constant_time_eq(signature.as_bytes(), expected.as_bytes()).then_some(payload)
    }

    fn digest(&self, purpose: &[u8], data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(purpose);
        hasher.update(data);
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl CsrfValidator for DeleteTokenManager {
    fn is_delete_token_valid(&self, row_identity: &str, request: &AdminRequest) -> bool {
        let Some(submitted) = request
            .form_field(TOKEN_FIELD)
            .or_else(|| request.header(TOKEN_HEADER))
        else {
            return false;
        };
        constant_time_eq(
            submitted.as_bytes(),
            self.delete_token(row_identity).as_bytes(),
        )
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Method};
    use std::collections::HashMap;

    fn post_with_token(token: &str) -> AdminRequest {
        AdminRequest::new(Method::POST, "delete").with_form(HashMap::from([(
            TOKEN_FIELD.to_string(),
            token.to_string(),
        )]))
    }

    #[test]
    fn token_is_scoped_to_the_row() {
        let tokens = DeleteTokenManager::new("secret");
        let token = tokens.delete_token("42");
        assert!(tokens.is_delete_token_valid("42", &post_with_token(&token)));
        assert!(!tokens.is_delete_token_valid("43", &post_with_token(&token)));
        assert!(!tokens.is_delete_token_valid("42", &post_with_token("forged")));
    }

    #[test]
    fn token_may_arrive_in_a_header() {
        let tokens = DeleteTokenManager::new("secret");
        let mut headers = HeaderMap::new();
        headers.insert(
            TOKEN_HEADER,
            HeaderValue::from_str(&tokens.delete_token("7")).expect("header"),
        );
        let request = AdminRequest::new(Method::POST, "delete").with_headers(headers);
        assert!(tokens.is_delete_token_valid("7", &request));
        assert!(!tokens.is_delete_token_valid("7", &AdminRequest::new(Method::POST, "delete")));
    }

    #[test]
    fn signed_values_verify_only_under_the_same_secret() {
        let tokens = DeleteTokenManager::new("secret");
        let signed = tokens.sign("payload");
        assert_eq!(tokens.verify(&signed), Some("payload"));
        assert_eq!(DeleteTokenManager::new("other").verify(&signed), None);
        assert_eq!(tokens.verify("payload"), None);
        assert_eq!(tokens.verify(&signed.replace("payload", "forged")), None);
    }

    #[test]
    fn secrets_produce_distinct_tokens() {
        assert_ne!(
            DeleteTokenManager::new("a").delete_token("1"),
            DeleteTokenManager::new("b").delete_token("1")
        );
    }
}
