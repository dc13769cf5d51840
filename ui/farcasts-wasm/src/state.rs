//! Global application state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! Borrows never span an `.await`: async drivers take what they need, release
//! the borrow, await, then write the result back.

use std::cell::RefCell;
use std::rc::Rc;

use fc_client_core::{ChainContext, PageShell};
use fc_registry::AvatarRecords;
use fc_registry_rpc::{EnsAvatars, RpcRegistry};

use crate::provider::Eip1193;

/// Avatar source: ENS when a registry is configured, otherwise none.
pub enum Avatars {
    Ens(EnsAvatars<Rc<Eip1193>>),
    Disabled,
}

#[async_trait::async_trait(?Send)]
impl AvatarRecords for Avatars {
    async fn avatar_of(&self, address: &fc_types::Address) -> anyhow::Result<Option<String>> {
        match self {
            Avatars::Ens(ens) => ens.avatar_of(address).await,
            Avatars::Disabled => Ok(None),
        }
    }
}

pub type AppContext = ChainContext<RpcRegistry<Rc<Eip1193>>, Rc<Eip1193>, Avatars>;

/// Central application state.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub shell: PageShell,
    pub notice: Option<String>,
}

// ── Thread-local singletons ──

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
    static CONTEXT: RefCell<Option<Rc<AppContext>>> = const { RefCell::new(None) };
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

// ── Chain context ──

pub fn context() -> Option<Rc<AppContext>> {
    CONTEXT.with(|c| c.borrow().clone())
}

pub fn set_context(ctx: AppContext) {
    CONTEXT.with(|c| *c.borrow_mut() = Some(Rc::new(ctx)));
}

// ── Convenience accessors ──

pub fn set_notice(notice: Option<String>) {
    with_mut(|s| s.notice = notice);
}
