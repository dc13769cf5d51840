//! State → DOM.
//!
//! `render` is idempotent and cheap; drivers call it after every state change.

use fc_client_core::{EditFlow, EditMode, PageShell, RegistrationFlow, ViewKind, resolve_avatar};
use fc_types::{AccountInformation, ConnectionStatus};

use crate::dom::{self, Elements};
use crate::state::{self, AppContext};

pub fn render(els: &Elements) {
    let ctx = state::context();
    state::with(|s| {
        render_header(els, &s.shell, s.notice.as_deref());

        let view = s.shell.view();
        dom::set_visible(&els.loading_note, view == ViewKind::Loading);
        dom::set_visible(&els.registration_section, view == ViewKind::Registration);
        dom::set_visible(&els.account_section, matches!(view, ViewKind::EditAccount(_)));

        match view {
            ViewKind::Registration => render_registration(els, s.shell.registration()),
            ViewKind::EditAccount(account) => {
                render_account(els, s.shell.edit(), &account, ctx.as_deref())
            }
            ViewKind::ConnectPrompt | ViewKind::Loading => {}
        }
    });
}

fn render_header(els: &Elements, shell: &PageShell, notice: Option<&str>) {
    dom::set_text(&els.connect_btn, &shell.connect_label());
    els.connect_btn
        .set_disabled(shell.connection() == ConnectionStatus::Connecting);

    match notice {
        Some(text) => dom::set_text(&els.notice, text),
        None => dom::set_text(&els.notice, ""),
    }
    dom::set_visible(&els.notice, notice.is_some());
}

fn render_registration(els: &Elements, flow: &RegistrationFlow) {
    dom::set_input_value(&els.username_input, flow.username());
    dom::set_input_value(&els.registration_uri_input, flow.directory_uri());
    dom::set_text(&els.claim_btn, flow.submit_label());
    els.claim_btn.set_disabled(!flow.submit_enabled());
    dom::set_status_lines(&els.registration_status, &flow.status_lines());
}

fn render_account(
    els: &Elements,
    flow: &EditFlow,
    account: &AccountInformation,
    ctx: Option<&AppContext>,
) {
    dom::set_text(&els.account_breadcrumb, flow.breadcrumb());

    let editing = flow.mode() == EditMode::Edit;
    dom::set_visible(&els.account_display, !editing);
    dom::set_visible(&els.edit_form, editing);

    let record = flow.avatar_record(&account.address);
    let avatar = match ctx {
        Some(ctx) => ctx.avatar_url(record, &account.address),
        None => resolve_avatar(record, &account.address),
    };
    if els.account_avatar.src() != avatar {
        els.account_avatar.set_src(&avatar);
    }
    dom::set_text(&els.account_username, account.username.as_str());
    dom::set_text(&els.account_directory, account.directory_url.as_str());

    if editing {
        dom::set_input_value(&els.edit_uri_input, flow.draft());
        dom::set_text(&els.update_btn, flow.submit_label());
        els.update_btn.set_disabled(!flow.submit_enabled());
        dom::set_status_lines(&els.edit_status, &flow.status_lines());
    } else {
        dom::set_status_lines(&els.edit_status, &[]);
    }
}
