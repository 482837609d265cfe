//! Conditional enabling of form controls driven by a checkbox or a select.

use shared::domain::AuthMethod;

use crate::page::Page;

pub const KONNEKTOR_ACTIVATED: &str = "activated";
pub const KONNEKTOR_AUTH_METHOD: &str = "konnektorAuthMethod";

pub const KONNEKTOR_FIELDS: [&str; 10] = [
    "ip",
    "name",
    "timeout",
    KONNEKTOR_AUTH_METHOD,
    "certAuthPwd",
    "certAuthPwdCheck",
    "certFilename",
    "basicAuthUser",
    "basicAuthPwd",
    "basicAuthPwdCheck",
];
pub const CERT_AUTH_FIELDS: [&str; 3] = ["certAuthPwd", "certAuthPwdCheck", "certFilename"];
pub const BASIC_AUTH_FIELDS: [&str; 3] = ["basicAuthUser", "basicAuthPwd", "basicAuthPwdCheck"];

/// Enables `fields` while the `driver` checkbox is checked. Fields missing
/// from the page are skipped.
pub fn toggle_on_checked(page: &mut Page, driver: &str, fields: &[&str]) {
    let checked = page.is_checked(driver);
    set_enabled(page, fields, checked);
}

/// Enables `fields` while the `driver` select holds `value`.
pub fn toggle_on_selected(page: &mut Page, driver: &str, value: &str, fields: &[&str]) {
    let selected = page.control_value(driver) == Some(value);
    set_enabled(page, fields, selected);
}

fn set_enabled(page: &mut Page, fields: &[&str], enabled: bool) {
    for field in fields {
        if let Err(err) = page.set_disabled(field, !enabled) {
            tracing::trace!(%err, "toggle target skipped");
        }
    }
}

/// Rules of the konnektor form, applied in order: the activation checkbox
/// first, then the two authentication method groups.
pub fn apply_konnektor_rules(page: &mut Page) {
    toggle_on_checked(page, KONNEKTOR_ACTIVATED, &KONNEKTOR_FIELDS);
    toggle_on_selected(
        page,
        KONNEKTOR_AUTH_METHOD,
        AuthMethod::Cert.as_form_value(),
        &CERT_AUTH_FIELDS,
    );
    toggle_on_selected(
        page,
        KONNEKTOR_AUTH_METHOD,
        AuthMethod::Basicauth.as_form_value(),
        &BASIC_AUTH_FIELDS,
    );
}

#[cfg(test)]
#[path = "tests/toggles_tests.rs"]
mod tests;
