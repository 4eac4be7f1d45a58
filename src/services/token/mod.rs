pub mod cache;
pub mod factory;
pub mod introspect;
pub mod record;
pub mod verifier;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

pub use cache::TokenCache;
pub use factory::build_token_verifier;
pub use introspect::{IntrospectionError, Introspector, KeycloakIntrospector};
pub use record::IntrospectionRecord;
pub use verifier::{TokenError, TokenVerifier, extract_bearer};

/// Short, non-reversible token identifier for logs. Raw tokens are never logged.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(12);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = fingerprint("secret-token");
        assert_eq!(a.len(), 12);
        assert_eq!(a, fingerprint("secret-token"));
        assert_ne!(a, fingerprint("secret-token-2"));
        assert!(!a.contains("secret"));
    }
}
