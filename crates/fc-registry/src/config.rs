use alloy_primitives::address;
use fc_types::Address;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REGISTRY_ADDRESS: Address = address!("0xe3Be01D99bAa8dB9905b33a3cA391238234B79D1");
pub const DEFAULT_ENS_REGISTRY: Address = address!("0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
pub const DEFAULT_AVATAR_FALLBACK: &str = "https://effigy.im/a/";

/// Where the registry lives and how the client talks to it.
///
/// The page supplies overrides as inline JSON; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub contract_address: Address,
    /// Expected network. `None` leaves network selection to the wallet.
    pub chain_id: Option<u64>,
    pub ens_registry: Option<Address>,
    /// Identicon endpoint; the lower-case address and `.svg` are appended.
    pub avatar_fallback_base: String,
    pub confirmation_poll_ms: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_REGISTRY_ADDRESS,
            chain_id: None,
            ens_registry: Some(DEFAULT_ENS_REGISTRY),
            avatar_fallback_base: DEFAULT_AVATAR_FALLBACK.to_owned(),
            confirmation_poll_ms: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_registry() {
        let config = RegistryConfig::default();
        assert_eq!(
            config.contract_address.to_string(),
            "0xe3Be01D99bAa8dB9905b33a3cA391238234B79D1"
        );
        assert_eq!(config.chain_id, None);
        assert_eq!(config.ens_registry, Some(DEFAULT_ENS_REGISTRY));
        assert_eq!(config.confirmation_poll_ms, 2_000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{ "chain_id": 5, "confirmation_poll_ms": 500 }"#).unwrap();
        assert_eq!(config.chain_id, Some(5));
        assert_eq!(config.confirmation_poll_ms, 500);
        assert_eq!(config.contract_address, DEFAULT_REGISTRY_ADDRESS);
    }

    #[test]
    fn ens_can_be_switched_off() {
        let config: RegistryConfig = serde_json::from_str(r#"{ "ens_registry": null }"#).unwrap();
        assert_eq!(config.ens_registry, None);
    }

    #[test]
    fn bad_address_is_an_error() {
        let result = serde_json::from_str::<RegistryConfig>(r#"{ "contract_address": "nope" }"#);
        assert!(result.is_err());
    }
}
