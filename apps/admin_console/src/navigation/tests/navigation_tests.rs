use super::*;

use std::time::Duration;

use url::Url;

use crate::page::{Element, Modal, Page, Spinner};

fn page() -> Page {
    Page::with_base(Url::parse("http://console.local/").expect("url"))
}

#[test]
fn wide_viewport_follows_scroll_position() {
    let top = navbar_state(1200.0, 0.0, DEFAULT_BREAKPOINT);
    assert_eq!(top.style, NavbarStyle::Top);
    assert!(!top.body_scrolled);

    let scrolled = navbar_state(1200.0, 1.0, DEFAULT_BREAKPOINT);
    assert_eq!(scrolled.style, NavbarStyle::Scrolled);
    assert!(scrolled.body_scrolled);
}

#[test]
fn narrow_viewport_is_always_scrolled_without_body_marker() {
    for y in [0.0, 250.0] {
        let state = navbar_state(991.0, y, DEFAULT_BREAKPOINT);
        assert_eq!(state.style, NavbarStyle::Scrolled);
        assert!(!state.body_scrolled);
    }
    assert_eq!(
        navbar_state(992.0, 0.0, DEFAULT_BREAKPOINT).style,
        NavbarStyle::Top
    );
}

#[test]
fn applying_navbar_swaps_classes() {
    let mut page = page();
    apply_navbar(&mut page, navbar_state(1200.0, 0.0, DEFAULT_BREAKPOINT));
    assert!(page.has_class(Element::Navbar, "navbar-dark"));
    assert!(page.has_class(Element::NavButtons, "text-white"));
    assert!(page.has_class(Element::Logo, "ebook-light"));
    assert!(!page.has_class(Element::Body, "scroll"));

    apply_navbar(&mut page, navbar_state(1200.0, 40.0, DEFAULT_BREAKPOINT));
    assert!(page.has_class(Element::Body, "scroll"));
    assert!(page.has_class(Element::Navbar, "navbar-light"));
    assert!(!page.has_class(Element::Navbar, "navbar-dark"));
    assert!(page.has_class(Element::NavButtons, "text-black"));
    assert!(!page.has_class(Element::NavButtons, "text-white"));
    assert!(!page.has_class(Element::Logo, "ebook-light"));
}

#[test]
fn scroll_animation_eases_from_start_to_target() {
    let animation = ScrollAnimation::towards(100.0, 571.0, HEADER_OFFSET, SCROLL_DURATION);
    assert_eq!(animation.to, 500.0);

    assert_eq!(animation.position_at(Duration::ZERO), 100.0);
    assert!((animation.position_at(Duration::from_millis(300)) - 300.0).abs() < 1e-9);
    assert!(animation.position_at(Duration::from_millis(150)) < 200.0);
    assert_eq!(animation.position_at(SCROLL_DURATION), 500.0);
    assert_eq!(animation.position_at(Duration::from_secs(5)), 500.0);
    assert!(!animation.is_finished(Duration::from_millis(599)));
    assert!(animation.is_finished(SCROLL_DURATION));
}

#[test]
fn only_known_hash_links_are_intercepted() {
    let mut page = page();
    page.set_anchor_offset("funktionen", 871.0);
    page.set_scroll_y(20.0);

    let animation =
        intercept_anchor(&page, "#funktionen", HEADER_OFFSET, SCROLL_DURATION).expect("anchor");
    assert_eq!(animation.from, 20.0);
    assert_eq!(animation.to, 800.0);

    assert!(intercept_anchor(&page, "#", HEADER_OFFSET, SCROLL_DURATION).is_none());
    assert!(intercept_anchor(&page, "#unbekannt", HEADER_OFFSET, SCROLL_DURATION).is_none());
    assert!(intercept_anchor(&page, "/hilfe#funktionen", HEADER_OFFSET, SCROLL_DURATION).is_none());
}

#[test]
fn login_error_query_opens_the_dialog() {
    let mut page = page();
    page.set_viewport(1200.0, 0.0);

    login::on_load(
        &mut page,
        &Url::parse("http://console.local/login?error").expect("url"),
        DEFAULT_BREAKPOINT,
    );
    assert!(page.is_modal_open(Modal::LoginError));
    assert!(page.has_class(Element::Navbar, "navbar-dark"));

    let mut clean = self::page();
    login::on_load(
        &mut clean,
        &Url::parse("http://console.local/login?logout").expect("url"),
        DEFAULT_BREAKPOINT,
    );
    assert!(!clean.is_modal_open(Modal::LoginError));
}

#[test]
fn login_submit_locks_the_form_until_rejected() {
    let mut page = page();
    page.load_document(
        r#"<form id="login-form">
<input type="text" id="username" name="username" required/>
<button type="submit" id="login-submit">Anmelden</button>
<button type="button" id="login-close">Abbrechen</button>
</form>"#,
    );
    let busy = Spinner::Form(login::LOGIN_FORM.to_string());

    let invalid = login::on_submit(&mut page).expect("submit");
    assert_eq!(invalid.len(), 1);
    assert!(!page.is_disabled(login::LOGIN_SUBMIT));
    assert!(!page.spinner_visible(&busy));

    page.set_value("username", "admin").expect("user");
    assert!(login::on_submit(&mut page).expect("submit").is_empty());
    assert!(page.is_disabled(login::LOGIN_SUBMIT));
    assert!(page.is_disabled(login::LOGIN_CLOSE));
    assert!(page.spinner_visible(&busy));

    login::on_rejected(&mut page).expect("rejected");
    assert!(!page.is_disabled(login::LOGIN_SUBMIT));
    assert!(!page.spinner_visible(&busy));
    assert!(page.is_modal_open(Modal::LoginError));
}
