// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use smallvec::{SmallVec, smallvec};

use crate::input::{InputSource, PointerType};

/// Which native family is canonical for touch contacts.
///
/// Platforms commonly deliver a touch twice: once as a pointer-style event
/// with [`PointerType::Touch`] and once as a touch-list event. Only the
/// selected family drives drag gestures.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchSource {
    /// Touch contacts come from pointer-style events.
    PointerEvents,
    /// Touch contacts come from touch-list events.
    #[default]
    TouchEvents,
}

/// Tunables for an [`Engine`](crate::engine::Engine).
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
    /// Minimum displacement, in surface pixels along either axis, before a
    /// pressed draggable node starts dragging.
    pub drag_distance: f64,
    /// Double click / double tap window in milliseconds.
    pub double_click_window: u64,
    /// Canonical family for touch contacts.
    pub touch_source: TouchSource,
    /// Buttons that arm a drag on press (`0` is the primary button).
    pub drag_buttons: SmallVec<[u16; 2]>,
    /// Keep hover synthesis and move routing running while something is dragged.
    pub hit_on_drag: bool,
    /// Capture each touch for the node it started on.
    pub capture_touch_events: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_distance: 3.0,
            double_click_window: 400,
            touch_source: TouchSource::default(),
            drag_buttons: smallvec![0],
            hit_on_drag: false,
            capture_touch_events: false,
        }
    }
}

impl InteractionConfig {
    /// Set the drag threshold.
    pub fn with_drag_distance(mut self, distance: f64) -> Self {
        self.drag_distance = distance;
        self
    }

    /// Set the double click window in milliseconds.
    pub fn with_double_click_window(mut self, window: u64) -> Self {
        self.double_click_window = window;
        self
    }

    /// Set the canonical touch family.
    pub fn with_touch_source(mut self, source: TouchSource) -> Self {
        self.touch_source = source;
        self
    }

    /// Replace the set of drag buttons.
    pub fn with_drag_buttons(mut self, buttons: impl IntoIterator<Item = u16>) -> Self {
        self.drag_buttons = buttons.into_iter().collect();
        self
    }

    /// Keep hit testing alive during drags.
    pub fn with_hit_on_drag(mut self, enabled: bool) -> Self {
        self.hit_on_drag = enabled;
        self
    }

    /// Capture touches for the node they start on.
    pub fn with_capture_touch_events(mut self, enabled: bool) -> Self {
        self.capture_touch_events = enabled;
        self
    }

    /// Whether events from `source` feed the drag controller.
    ///
    /// Mouse and pen input always does. Touch contacts only count from the
    /// family selected by [`touch_source`](Self::touch_source).
    pub fn drives_drag(&self, source: InputSource) -> bool {
        match source {
            InputSource::Pointer(PointerType::Touch) => {
                self.touch_source == TouchSource::PointerEvents
            }
            InputSource::Pointer(_) => true,
            InputSource::Touch => self.touch_source == TouchSource::TouchEvents,
        }
    }

    /// Whether a press with `button` may arm a drag. Presses without a button always may.
    pub fn is_drag_button(&self, button: Option<u16>) -> bool {
        button.is_none_or(|b| self.drag_buttons.contains(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = InteractionConfig::default();
        assert_eq!(config.drag_distance, 3.0);
        assert_eq!(config.double_click_window, 400);
        assert_eq!(config.touch_source, TouchSource::TouchEvents);
        assert!(config.is_drag_button(Some(0)));
        assert!(!config.is_drag_button(Some(2)));
        assert!(config.is_drag_button(None));
    }

    #[test]
    fn touch_family_filter() {
        let touch_lists = InteractionConfig::default();
        assert!(touch_lists.drives_drag(InputSource::Pointer(PointerType::Mouse)));
        assert!(touch_lists.drives_drag(InputSource::Pointer(PointerType::Pen)));
        assert!(!touch_lists.drives_drag(InputSource::Pointer(PointerType::Touch)));
        assert!(touch_lists.drives_drag(InputSource::Touch));

        let pointers = touch_lists.with_touch_source(TouchSource::PointerEvents);
        assert!(pointers.drives_drag(InputSource::Pointer(PointerType::Touch)));
        assert!(!pointers.drives_drag(InputSource::Touch));
    }

    #[test]
    fn builders_replace_fields() {
        let config = InteractionConfig::default()
            .with_drag_distance(10.0)
            .with_double_click_window(250)
            .with_drag_buttons([0, 1])
            .with_hit_on_drag(true)
            .with_capture_touch_events(true);
        assert_eq!(config.drag_distance, 10.0);
        assert_eq!(config.double_click_window, 250);
        assert_eq!(config.drag_buttons.as_slice(), &[0, 1]);
        assert!(config.hit_on_drag && config.capture_touch_events);
    }
}
