use sha2::{Digest, Sha256};

/// Short, stable tag for a bearer token. Used as a map key and in logs so
/// the token itself never leaves the request.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..8])
}

/// Pull the token out of an `Authorization` header value.
pub fn bearer_from_header(value: &str) -> Option<String> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
        assert_eq!(fingerprint("abc").len(), 16);
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_from_header("Bearer xyz"), Some("xyz".to_string()));
        assert_eq!(bearer_from_header("Bearer   "), None);
        assert_eq!(bearer_from_header("Basic xyz"), None);
    }
}
