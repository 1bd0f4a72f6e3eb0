// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click window: single vs. double click (or tap) disambiguation.
//!
//! One window exists per device class, not per pointer. A press records its
//! target. A release on the same target is a click; if the window opened by a
//! previous release is still open and that release hit the same target, it is
//! also a double click. Every release re-arms the deadline, so at most one
//! deadline is ever pending.
//!
//! Time is supplied by the caller in milliseconds; expiry is evaluated lazily
//! on the next release or explicitly through [`ClickWindow::advance`].
//!
//! ```
//! use understory_pointer::click::ClickWindow;
//!
//! let mut clicks = ClickWindow::new(400);
//!
//! clicks.on_press(7_u32);
//! let first = clicks.on_release(7, 1_000, false);
//! assert!(first.click && !first.double);
//!
//! clicks.on_press(7);
//! let second = clicks.on_release(7, 1_200, false);
//! assert!(second.click && second.double);
//! ```

/// What one released target produced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClickResult {
    /// Press and release landed on the same target.
    pub click: bool,
    /// The click completed a double click.
    pub double: bool,
}

/// Timing window shared by one device class.
#[derive(Clone, Debug)]
pub struct ClickWindow<K> {
    duration: u64,
    open: bool,
    deadline: Option<u64>,
    listening: bool,
    press_target: Option<K>,
    last_release_target: Option<K>,
}

impl<K: Copy + PartialEq> ClickWindow<K> {
    /// Create a closed window with the given duration in milliseconds.
    pub fn new(duration: u64) -> Self {
        Self {
            duration,
            open: false,
            deadline: None,
            listening: false,
            press_target: None,
            last_release_target: None,
        }
    }

    /// Window duration in milliseconds.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Change the window duration; applies from the next release.
    pub fn set_duration(&mut self, duration: u64) {
        self.duration = duration;
    }

    /// Whether a double-click window is currently open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Record a press on `target` and start listening for its release.
    pub fn on_press(&mut self, target: K) {
        self.press_target = Some(target);
        self.listening = true;
    }

    /// Begin a release at `now`, returning whether this release may complete a double.
    ///
    /// A release that terminated a drag never opens the window. The deadline is
    /// always re-armed. Follow with [`classify`](Self::classify) for each
    /// released target and then [`finish`](Self::finish).
    pub fn release(&mut self, now: u64, just_dragged: bool) -> bool {
        self.advance(now);
        let double_armed = self.open;
        if !self.open && !just_dragged {
            self.open = true;
        }
        self.deadline = Some(now.saturating_add(self.duration));
        double_armed
    }

    /// Classify one released target of the release begun by [`release`](Self::release).
    pub fn classify(&mut self, target: K, double_armed: bool) -> ClickResult {
        let click = self.listening && self.press_target == Some(target);
        let double = click && double_armed && self.last_release_target == Some(target);
        self.last_release_target = Some(target);
        ClickResult { click, double }
    }

    /// End the release begun by [`release`](Self::release).
    pub fn finish(&mut self) {
        self.listening = false;
    }

    /// Release on a single target: [`release`](Self::release), [`classify`](Self::classify)
    /// and [`finish`](Self::finish) in one call.
    pub fn on_release(&mut self, target: K, now: u64, just_dragged: bool) -> ClickResult {
        let double_armed = self.release(now, just_dragged);
        let result = self.classify(target, double_armed);
        self.finish();
        result
    }

    /// Stop the pending press from producing a click (a drag consumed it).
    pub fn suppress(&mut self) {
        self.listening = false;
    }

    /// Close the window if its deadline has passed.
    pub fn advance(&mut self, now: u64) {
        if self.deadline.is_some_and(|d| now > d) {
            self.open = false;
            self.deadline = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_release(w: &mut ClickWindow<u32>, target: u32, now: u64) -> ClickResult {
        w.on_press(target);
        w.on_release(target, now, false)
    }

    #[test]
    fn release_elsewhere_is_not_a_click() {
        let mut w = ClickWindow::new(400);
        w.on_press(1);
        assert_eq!(w.on_release(2, 0, false), ClickResult::default());
    }

    #[test]
    fn second_pair_in_window_is_double() {
        let mut w = ClickWindow::new(400);
        assert_eq!(
            press_release(&mut w, 1, 100),
            ClickResult {
                click: true,
                double: false
            }
        );
        assert_eq!(
            press_release(&mut w, 1, 450),
            ClickResult {
                click: true,
                double: true
            }
        );
    }

    #[test]
    fn second_pair_after_window_is_single() {
        let mut w = ClickWindow::new(400);
        press_release(&mut w, 1, 100);
        let r = press_release(&mut w, 1, 501);
        assert!(r.click && !r.double, "window expired: {r:?}");
    }

    #[test]
    fn double_needs_same_target() {
        let mut w = ClickWindow::new(400);
        press_release(&mut w, 1, 0);
        let r = press_release(&mut w, 2, 10);
        assert!(r.click && !r.double, "different target: {r:?}");
    }

    #[test]
    fn window_stays_open_after_double() {
        let mut w = ClickWindow::new(400);
        press_release(&mut w, 1, 0);
        assert!(press_release(&mut w, 1, 100).double);
        assert!(press_release(&mut w, 1, 200).double);
    }

    #[test]
    fn suppressed_press_produces_no_click_and_no_window() {
        let mut w = ClickWindow::new(400);
        w.on_press(1);
        w.suppress();
        assert_eq!(w.on_release(1, 0, true), ClickResult::default());
        assert!(!w.is_open());
        assert_eq!(w.deadline(), Some(400));
    }

    #[test]
    fn advance_closes_expired_window() {
        let mut w = ClickWindow::new(400);
        press_release(&mut w, 1, 0);
        assert!(w.is_open());
        w.advance(400);
        assert!(w.is_open());
        w.advance(401);
        assert!(!w.is_open());
        assert_eq!(w.deadline(), None);
    }

    #[test]
    fn classify_handles_many_targets_for_one_release() {
        let mut w = ClickWindow::new(400);
        w.on_press(1);
        let armed = w.release(0, false);
        assert!(!armed);
        assert!(w.classify(1, armed).click);
        assert!(!w.classify(2, armed).click);
        w.finish();
        // The last classified target is what a double is measured against.
        w.on_press(2);
        assert!(w.on_release(2, 100, false).double);
    }
}
