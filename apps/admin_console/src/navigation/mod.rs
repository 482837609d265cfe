//! Scroll-driven navbar styling, smooth in-page scrolling and the login page.

pub mod login;
pub mod navbar;
pub mod scroll;

pub use navbar::{apply_navbar, navbar_state, NavbarState, NavbarStyle, DEFAULT_BREAKPOINT};
pub use scroll::{intercept_anchor, ScrollAnimation, HEADER_OFFSET, SCROLL_DURATION};

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
