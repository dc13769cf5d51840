//! Farcasts WASM front end.
//!
//! Binds the static page in `index.html` to the client state in
//! `fc-client-core`, using the injected EIP-1193 wallet for reads, network
//! selection and signing.

pub mod actions;
pub mod config;
pub mod dom;
pub mod events;
pub mod provider;
pub mod render;
pub mod state;

use std::rc::Rc;

use fc_client_core::ChainContext;
use fc_client_core::shell::PAGE_META;
use fc_registry_rpc::{EnsAvatars, RpcRegistry};
use wasm_bindgen::prelude::*;

use crate::provider::Eip1193;
use crate::state::Avatars;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;
    apply_meta(&els);

    let config = config::load();
    match Eip1193::detect() {
        Some(provider) => {
            let provider = Rc::new(provider);
            let registry = RpcRegistry::new(provider.clone(), config.contract_address);
            let avatars = match config.ens_registry {
                Some(ens) => Avatars::Ens(EnsAvatars::new(provider.clone(), ens)),
                None => Avatars::Disabled,
            };
            events::bind_wallet_events(&els, &provider);
            state::set_context(ChainContext::new(registry, provider, config).with_avatars(avatars));
        }
        None => gloo_console::warn!("no injected wallet (window.ethereum)"),
    }

    events::bind_events(&els);

    // Wallet-dependent output starts only now that we run in the browser.
    actions::start(&els).await;

    Ok(())
}

fn apply_meta(els: &dom::Elements) {
    let doc = dom::document();
    doc.set_title(PAGE_META.title);
    if let Ok(Some(meta)) = doc.query_selector("meta[name=description]") {
        let _ = meta.set_attribute("content", PAGE_META.description);
    }
    if let Ok(Some(icon)) = doc.query_selector("link[rel=icon]") {
        let _ = icon.set_attribute("href", PAGE_META.icon);
    }
    dom::set_text(&els.heading, PAGE_META.heading);
    dom::set_text(&els.tagline, PAGE_META.tagline);
    let _ = els.learn_more.set_attribute("href", PAGE_META.learn_more_url);
    let _ = els.credit_link.set_attribute("href", PAGE_META.credit_url);
    dom::set_text(&els.credit_link, PAGE_META.credit_name);
}
