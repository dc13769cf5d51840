//! Event binding.
//!
//! Wires all UI event listeners. Async work is spawned via
//! `wasm_bindgen_futures::spawn_local`.

use fc_client_core::{Form, PageShell};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::actions;
use crate::dom::{self, Elements};
use crate::render::render;
use crate::state;

/// Helper: attach async click handler to an element.
macro_rules! on_click_async {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Helper: attach sync click handler.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Helper: form submit without navigation, then an async handler.
macro_rules! on_submit_async {
    ($form:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |e: web_sys::Event| {
            e.prevent_default();
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $form
            .add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Helper: `input` listener that stores the value then re-prepares `form`.
macro_rules! on_input_prepare {
    ($input:expr, $els:expr, $form:expr, $store:expr) => {{
        let els = $els.clone();
        let input = $input.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let value = dom::get_input_value(&input);
            state::with_mut(|s| $store(&mut s.shell, value.as_str()));
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                actions::prepare(&els2, $form).await;
            });
        }) as Box<dyn FnMut(_)>);
        $input
            .add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) {
    // ── Connect ──
    on_click_async!(els.connect_btn, els, actions::connect);

    // ── Registration ──
    on_input_prepare!(
        els.username_input,
        els,
        Form::Registration,
        |shell: &mut PageShell, v: &str| shell.registration_mut().set_username(v)
    );
    on_input_prepare!(
        els.registration_uri_input,
        els,
        Form::Registration,
        |shell: &mut PageShell, v: &str| shell.registration_mut().set_directory_uri(v)
    );
    on_submit_async!(els.registration_form, els, actions::submit_registration);

    // ── Account card ──
    {
        let els2 = els.clone();
        on_click!(els.account_home_btn, move |_: web_sys::MouseEvent| {
            state::with_mut(|s| s.shell.edit_mut().show_account());
            render(&els2);
        });
    }
    {
        let els2 = els.clone();
        on_click!(els.edit_btn, move |_: web_sys::MouseEvent| {
            if !state::with_mut(|s| s.shell.begin_edit()) {
                return;
            }
            render(&els2);
            let els3 = els2.clone();
            wasm_bindgen_futures::spawn_local(async move {
                actions::prepare(&els3, Form::Edit).await;
            });
        });
    }

    // ── Edit form ──
    on_input_prepare!(
        els.edit_uri_input,
        els,
        Form::Edit,
        |shell: &mut PageShell, v: &str| shell.edit_mut().set_draft(v)
    );
    on_submit_async!(els.edit_form, els, actions::submit_edit);
}

/// Follows the wallet's account list for the lifetime of the page.
pub fn bind_wallet_events(els: &Elements, provider: &crate::provider::Eip1193) {
    let els2 = els.clone();
    if let Err(err) = provider.on_accounts_changed(move |accounts| {
        actions::accounts_changed(&els2, accounts);
    }) {
        gloo_console::warn!("accountsChanged subscription failed", err);
    }
}
