//! Secret handling utilities.
//!
//! Re-exports the secrecy types the crate hands out, plus a helper for
//! describing a secret without revealing it.

pub use secrecy::{ExposeSecret, SecretString};

/// "Set" or "Not Set" for an optional secret. Never looks at the value.
pub fn presence(secret: Option<&SecretString>) -> &'static str {
    if secret.is_some() { "Set" } else { "Not Set" }
}
