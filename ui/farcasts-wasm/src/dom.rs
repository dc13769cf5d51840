//! DOM element bindings.
//!
//! All fields are resolved once at startup from the ids in `index.html`.

use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlImageElement,
    HtmlInputElement,
};

use fc_client_core::{StatusKind, StatusLine};

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value()
}

pub fn set_input_value(el: &HtmlInputElement, val: &str) {
    if el.value() != val {
        el.set_value(val);
    }
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_visible(el: &Element, visible: bool) {
    toggle_class(el, "hidden", !visible);
}

/// Replaces the children of `container` with one `<p>` per status line.
pub fn set_status_lines(container: &Element, lines: &[StatusLine]) {
    container.set_inner_html("");
    let doc = document();
    for line in lines {
        let Ok(p) = doc.create_element("p") else {
            continue;
        };
        let cls = match line.kind {
            StatusKind::Info => "status",
            StatusKind::Success => "status success",
            StatusKind::Error => "status error",
        };
        p.set_class_name(cls);
        p.set_text_content(Some(&line.text));
        let _ = container.append_child(&p);
    }
}

// ── Elements struct ──

/// All DOM element references used by the page.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Header
    pub heading: Element,
    pub tagline: Element,
    pub learn_more: Element,
    pub connect_btn: HtmlButtonElement,
    pub loading_note: Element,
    pub notice: Element,

    // Registration
    pub registration_section: Element,
    pub registration_form: HtmlFormElement,
    pub username_input: HtmlInputElement,
    pub registration_uri_input: HtmlInputElement,
    pub claim_btn: HtmlButtonElement,
    pub registration_status: Element,

    // Account card
    pub account_section: Element,
    pub account_home_btn: HtmlElement,
    pub account_breadcrumb: Element,
    pub account_display: Element,
    pub account_avatar: HtmlImageElement,
    pub account_username: Element,
    pub account_directory: Element,
    pub edit_btn: HtmlElement,

    // Edit form
    pub edit_form: HtmlFormElement,
    pub edit_uri_input: HtmlInputElement,
    pub update_btn: HtmlButtonElement,
    pub edit_status: Element,

    // Footer
    pub credit_link: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id).ok_or_else(|| {
            JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id))
        })?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after the document has loaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            heading: get_el!("heading"),
            tagline: get_el!("tagline"),
            learn_more: get_el!("learnMore"),
            connect_btn: get_typed!(HtmlButtonElement, "connectBtn"),
            loading_note: get_el!("loadingNote"),
            notice: get_el!("notice"),

            registration_section: get_el!("registrationSection"),
            registration_form: get_typed!(HtmlFormElement, "registrationForm"),
            username_input: get_typed!(HtmlInputElement, "usernameInput"),
            registration_uri_input: get_typed!(HtmlInputElement, "registrationUriInput"),
            claim_btn: get_typed!(HtmlButtonElement, "claimBtn"),
            registration_status: get_el!("registrationStatus"),

            account_section: get_el!("accountSection"),
            account_home_btn: get_typed!(HtmlElement, "accountHomeBtn"),
            account_breadcrumb: get_el!("accountBreadcrumb"),
            account_display: get_el!("accountDisplay"),
            account_avatar: get_typed!(HtmlImageElement, "accountAvatar"),
            account_username: get_el!("accountUsername"),
            account_directory: get_el!("accountDirectory"),
            edit_btn: get_typed!(HtmlElement, "editBtn"),

            edit_form: get_typed!(HtmlFormElement, "editForm"),
            edit_uri_input: get_typed!(HtmlInputElement, "editUriInput"),
            update_btn: get_typed!(HtmlButtonElement, "updateBtn"),
            edit_status: get_el!("editStatus"),

            credit_link: get_el!("creditLink"),
        })
    }
}
