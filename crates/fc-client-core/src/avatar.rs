//! Avatar image resolution.

use fc_registry::config::DEFAULT_AVATAR_FALLBACK;
use fc_types::{Address, AddressExt};

/// Avatar image URL for an account. Never fails: without a record the
/// identicon for the address is used.
pub fn resolve_avatar(avatar_uri: Option<&str>, address: &Address) -> String {
    resolve_avatar_with(DEFAULT_AVATAR_FALLBACK, avatar_uri, address)
}

pub fn resolve_avatar_with(fallback_base: &str, avatar_uri: Option<&str>, address: &Address) -> String {
    if let Some(uri) = avatar_uri.filter(|uri| !uri.trim().is_empty()) {
        return uri.to_owned();
    }
    let base = if fallback_base.trim().is_empty() {
        DEFAULT_AVATAR_FALLBACK
    } else {
        fallback_base
    };
    format!("{base}{}.svg", address.to_lower_hex())
}
