use crate::page::{Element, Page};

/// Viewport width from which the navbar reacts to the scroll position.
pub const DEFAULT_BREAKPOINT: f64 = 992.0;

const BODY_SCROLLED: &str = "scroll";
const NAVBAR_DARK: &str = "navbar-dark";
const NAVBAR_LIGHT: &str = "navbar-light";
const NAV_BUTTONS_DARK: &str = "text-white";
const NAV_BUTTONS_LIGHT: &str = "text-black";
const LOGO_LIGHT: &str = "ebook-light";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarStyle {
    /// Dark navbar, white buttons, light logo.
    Top,
    /// Light navbar, black buttons, regular logo.
    Scrolled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavbarState {
    pub style: NavbarStyle,
    /// Whether the body carries the `scroll` marker class.
    pub body_scrolled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassChange {
    pub element: Element,
    pub class: &'static str,
    pub present: bool,
}

impl NavbarStyle {
    /// Class changes for navbar, nav buttons and logo.
    pub fn classes(self) -> [ClassChange; 5] {
        let scrolled = self == Self::Scrolled;
        let change = |element, class, present| ClassChange {
            element,
            class,
            present,
        };
        [
            change(Element::Navbar, NAVBAR_DARK, !scrolled),
            change(Element::Navbar, NAVBAR_LIGHT, scrolled),
            change(Element::NavButtons, NAV_BUTTONS_DARK, !scrolled),
            change(Element::NavButtons, NAV_BUTTONS_LIGHT, scrolled),
            change(Element::Logo, LOGO_LIGHT, !scrolled),
        ]
    }
}

impl NavbarState {
    pub fn classes(self) -> Vec<ClassChange> {
        let mut changes = vec![ClassChange {
            element: Element::Body,
            class: BODY_SCROLLED,
            present: self.body_scrolled,
        }];
        changes.extend(self.style.classes());
        changes
    }
}

/// Navbar state for a viewport. Narrow viewports always get the scrolled
/// look, without the body marker.
pub fn navbar_state(viewport_width: f64, scroll_y: f64, breakpoint: f64) -> NavbarState {
    if viewport_width < breakpoint {
        return NavbarState {
            style: NavbarStyle::Scrolled,
            body_scrolled: false,
        };
    }
    if scroll_y > 0.0 {
        NavbarState {
            style: NavbarStyle::Scrolled,
            body_scrolled: true,
        }
    } else {
        NavbarState {
            style: NavbarStyle::Top,
            body_scrolled: false,
        }
    }
}

pub fn apply_navbar(page: &mut Page, state: NavbarState) {
    for change in state.classes() {
        if change.present {
            page.add_class(change.element, change.class);
        } else {
            page.remove_class(change.element, change.class);
        }
    }
}
