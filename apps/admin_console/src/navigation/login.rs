//! Behavior of the standalone login page.

use url::Url;

use crate::page::{form::InvalidControl, Modal, Page, PageError, Spinner};

use super::navbar::{apply_navbar, navbar_state};

pub const LOGIN_FORM: &str = "login-form";
pub const LOGIN_SUBMIT: &str = "login-submit";
pub const LOGIN_CLOSE: &str = "login-close";

/// A failed login comes back as the login page with an `error` query.
pub fn on_load(page: &mut Page, location: &Url, breakpoint: f64) {
    let failed = location
        .query()
        .is_some_and(|query| query.split('&').any(|pair| pair.split('=').next() == Some("error")));
    if failed {
        page.open_modal(Modal::LoginError);
    }
    apply_navbar(
        page,
        navbar_state(page.viewport_width(), page.scroll_y(), breakpoint),
    );
}

/// Validates the login form. A valid form locks its buttons and shows the
/// inline spinner; the caller then posts it. Returns the controls that block
/// the submit.
pub fn on_submit(page: &mut Page) -> Result<Vec<InvalidControl>, PageError> {
    let invalid = page.validate_form(LOGIN_FORM)?;
    if !invalid.is_empty() {
        tracing::debug!(form = LOGIN_FORM, invalid = invalid.len(), "login blocked");
        return Ok(invalid);
    }
    for button in [LOGIN_SUBMIT, LOGIN_CLOSE] {
        if page.control(button).is_some() {
            page.set_disabled(button, true)?;
        }
    }
    page.show_spinner(Spinner::Form(LOGIN_FORM.to_string()));
    Ok(invalid)
}

/// Unlocks the form after a rejected login.
pub fn on_rejected(page: &mut Page) -> Result<(), PageError> {
    for button in [LOGIN_SUBMIT, LOGIN_CLOSE] {
        if page.control(button).is_some() {
            page.set_disabled(button, false)?;
        }
    }
    page.hide_spinner(&Spinner::Form(LOGIN_FORM.to_string()));
    page.open_modal(Modal::LoginError);
    Ok(())
}
