//! Async sequencing over a [`PageShell`].
//!
//! Each driver takes a step from the shell, lets go of it, awaits the chain,
//! writes the answer back and tells the host to show the change. The host
//! owns the shell, so a front end only supplies storage, rendering and a
//! timer.

use async_trait::async_trait;
use fc_registry::{AvatarRecords, RegistryContract, WalletProvider};
use fc_types::Address;

use crate::context::ChainContext;
use crate::shell::{Form, PageShell};

/// Where the page state lives and how it is shown.
///
/// `with_shell` must not be held across an await; drivers only call it for
/// synchronous steps.
#[async_trait(?Send)]
pub trait ShellHost {
    fn with_shell<T>(&self, f: impl FnOnce(&mut PageShell) -> T) -> T;
    /// Called after every state change the page should show.
    fn changed(&self);
    async fn sleep(&self, ms: u32);
}

/// Mounts the page and picks up a session the wallet already authorised.
pub async fn start<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>) -> anyhow::Result<()>
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    host.with_shell(PageShell::mount);
    host.changed();
    match ctx.restore().await? {
        Some(address) => {
            host.with_shell(|shell| shell.connected(address));
            host.changed();
            load_account(host, ctx).await;
        }
        None => {
            host.with_shell(PageShell::disconnected);
            host.changed();
        }
    }
    Ok(())
}

/// Prompts the wallet for an account. A refusal leaves the page disconnected
/// and is returned to the caller.
pub async fn connect<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>) -> anyhow::Result<()>
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    if host.with_shell(|shell| shell.connection().is_connected()) {
        return Ok(());
    }
    host.with_shell(PageShell::set_connecting);
    host.changed();

    match ctx.connect().await {
        Ok(address) => {
            host.with_shell(|shell| shell.connected(address));
            host.changed();
            load_account(host, ctx).await;
            Ok(())
        }
        Err(err) => {
            host.with_shell(PageShell::disconnected);
            host.changed();
            Err(err)
        }
    }
}

pub async fn accounts_changed<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>, accounts: &[Address])
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    host.with_shell(|shell| shell.accounts_changed(accounts));
    host.changed();
    load_account(host, ctx).await;
}

/// Runs account reads until the binding settles, then fetches the avatar.
pub async fn load_account<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>)
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    while let Some(request) = host.with_shell(|shell| shell.binding_mut().next_read()) {
        let result = ctx.read(request).await;
        host.with_shell(|shell| shell.binding_mut().apply(result));
        host.changed();
    }

    let request = host.with_shell(|shell| {
        let account = shell.binding().account_information()?;
        shell.edit_mut().avatar_request(&account)
    });
    let Some(address) = request else {
        return;
    };
    let record = ctx.avatar_record(&address).await;
    host.with_shell(|shell| shell.edit_mut().set_avatar_record(address, record));
    host.changed();
}

/// Simulates the form's call for its current inputs.
pub async fn prepare<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>, form: Form)
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    let Some(from) = host.with_shell(|shell| shell.address()) else {
        return;
    };
    let job = host.with_shell(|shell| shell.begin_prepare(form));
    host.changed();
    let Some((generation, call)) = job else {
        return;
    };

    let result = ctx.prepare(&from, call).await;
    let applied = host.with_shell(|shell| {
        shell.address() == Some(from) && shell.submission_mut(form).finish_prepare(generation, result)
    });
    if applied {
        host.changed();
    }
}

/// Sends the prepared transaction and follows it to a receipt.
pub async fn submit<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>, form: Form)
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    let Some(from) = host.with_shell(|shell| shell.address()) else {
        return;
    };
    let Some(tx) = host.with_shell(|shell| shell.submission_mut(form).begin_submit()) else {
        return;
    };
    host.changed();

    let result = ctx.send(&tx).await;
    if host.with_shell(|shell| shell.address()) != Some(from) {
        return;
    }
    host.with_shell(|shell| shell.submission_mut(form).finish_submit(result));
    host.changed();

    track(host, ctx, form).await;
}

/// Polls for the receipt until the transaction settles, re-reading the
/// account once it is confirmed.
pub async fn track<H, R, W, A>(host: &H, ctx: &ChainContext<R, W, A>, form: Form)
where
    H: ShellHost,
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    let interval = ctx.config().confirmation_poll_ms;
    while let Some(hash) = host.with_shell(|shell| shell.submission(form).pending_hash()) {
        host.sleep(interval).await;
        let status = ctx.poll(&hash).await;
        let confirmed = host.with_shell(|shell| shell.record_status(form, &hash, status));
        host.changed();
        if confirmed {
            load_account(host, ctx).await;
        }
    }
}
