// soundcoin-core/src/auth/mod.rs
//
// Identity lives with an external provider; this module only relays
// signup/login and makes sure a profile exists for new accounts.

pub mod provider;

pub use provider::{AuthProvider, AuthProviderConfig};

/// Extracts the token from an `Authorization: Bearer <token>` header value.
/// Only presence and shape are checked.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
