use std::{f64::consts::PI, time::Duration};

use crate::page::Page;

/// Height of the fixed header the scroll target is shifted by.
pub const HEADER_OFFSET: f64 = 71.0;
pub const SCROLL_DURATION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
}

impl ScrollAnimation {
    /// Animation from `current` to the anchor at `target_offset`, stopping
    /// `header_offset` above it.
    pub fn towards(current: f64, target_offset: f64, header_offset: f64, duration: Duration) -> Self {
        Self {
            from: current,
            to: target_offset - header_offset,
            duration,
        }
    }

    /// Scroll position `elapsed` into the animation, with swing easing.
    pub fn position_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = 0.5 - (progress * PI).cos() / 2.0;
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// Turns a click on an in-page link into a scroll animation. Links that are
/// not `#id` references, or whose target is unknown, are left to the
/// browser.
pub fn intercept_anchor(
    page: &Page,
    href: &str,
    header_offset: f64,
    duration: Duration,
) -> Option<ScrollAnimation> {
    let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    let offset = page.anchor_offset(id)?;
    Some(ScrollAnimation::towards(
        page.scroll_y(),
        offset,
        header_offset,
        duration,
    ))
}
