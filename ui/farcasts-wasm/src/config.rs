//! Page configuration.
//!
//! Read from an optional inline block:
//! `<script id="registryConfig" type="application/json">{ ... }</script>`.
//! Missing fields keep their defaults.

use fc_registry::RegistryConfig;

use crate::dom;

pub const CONFIG_ELEMENT_ID: &str = "registryConfig";

pub fn load() -> RegistryConfig {
    let Some(raw) = dom::by_id(CONFIG_ELEMENT_ID).and_then(|el| el.text_content()) else {
        return RegistryConfig::default();
    };
    if raw.trim().is_empty() {
        return RegistryConfig::default();
    }
    match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            gloo_console::warn!(format!("ignoring #{CONFIG_ELEMENT_ID}: {err}"));
            RegistryConfig::default()
        }
    }
}
