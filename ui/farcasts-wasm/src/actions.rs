//! Browser host for the core drivers.
//!
//! The page state lives in [`state`]; every driver step re-renders through
//! [`render`]. This module only adds the page notice and the missing-wallet
//! case on top of `fc_client_core::driver`.

use async_trait::async_trait;
use fc_client_core::{Form, PageShell, ShellHost, driver};
use fc_types::Address;
use gloo_timers::future::TimeoutFuture;

use crate::dom::Elements;
use crate::render::render;
use crate::state;

pub const NO_WALLET: &str = "No browser wallet found. Install one to claim a handle.";

#[async_trait(?Send)]
impl ShellHost for Elements {
    fn with_shell<T>(&self, f: impl FnOnce(&mut PageShell) -> T) -> T {
        state::with_mut(|s| f(&mut s.shell))
    }

    fn changed(&self) {
        render(self);
    }

    async fn sleep(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }
}

fn missing_wallet(els: &Elements) {
    state::set_notice(Some(NO_WALLET.to_owned()));
    render(els);
}

/// Mounts the page and picks up a session the wallet already authorised.
pub async fn start(els: &Elements) {
    let Some(ctx) = state::context() else {
        els.with_shell(PageShell::mount);
        missing_wallet(els);
        return;
    };
    if let Err(err) = driver::start(els, ctx.as_ref()).await {
        gloo_console::warn!(format!("eth_accounts failed: {err:#}"));
        els.with_shell(PageShell::disconnected);
        render(els);
    }
}

pub async fn connect(els: &Elements) {
    let Some(ctx) = state::context() else {
        missing_wallet(els);
        return;
    };
    state::set_notice(None);
    if let Err(err) = driver::connect(els, ctx.as_ref()).await {
        gloo_console::warn!(format!("wallet connection failed: {err:#}"));
        state::set_notice(Some(err.to_string()));
        render(els);
    }
}

pub fn accounts_changed(els: &Elements, accounts: Vec<Address>) {
    let Some(ctx) = state::context() else {
        return;
    };
    let els = els.clone();
    wasm_bindgen_futures::spawn_local(async move {
        driver::accounts_changed(&els, ctx.as_ref(), &accounts).await;
    });
}

pub async fn prepare(els: &Elements, form: Form) {
    if let Some(ctx) = state::context() {
        driver::prepare(els, ctx.as_ref(), form).await;
    }
}

pub async fn submit_registration(els: &Elements) {
    if let Some(ctx) = state::context() {
        driver::submit(els, ctx.as_ref(), Form::Registration).await;
    }
}

pub async fn submit_edit(els: &Elements) {
    if let Some(ctx) = state::context() {
        driver::submit(els, ctx.as_ref(), Form::Edit).await;
    }
}
