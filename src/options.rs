use std::sync::Arc;

use crate::{Offset, ScrollInfo};

/// Default horizontal line scroll distance, in pixels.
pub const DEFAULT_HORIZONTAL_LINE: f64 = 32.0;
/// Default number of lines a single wheel notch scrolls.
pub const DEFAULT_WHEEL_LINES: u32 = 3;

/// A callback fired whenever the offset, viewport or extent changes, so an external scrollbar
/// can repaint.
pub type OnScrollInfoChanged = Arc<dyn Fn(ScrollInfo) + Send + Sync>;

/// A callback fired when the layout needs a new measure pass (e.g. after a scroll).
///
/// The layout never re-measures on its own; the host schedules the pass.
pub type OnInvalidateMeasure = Arc<dyn Fn() + Send + Sync>;

/// Configuration for [`crate::FixedStackLayout`].
///
/// Cheap to clone: hooks are stored in `Arc`s.
pub struct LayoutOptions {
    /// Height of every item. Must be finite and positive, otherwise the layout runs as a
    /// pass-through and realizes nothing.
    pub item_height: f64,
    /// Horizontal distance of a line left/right command.
    pub horizontal_line: f64,
    /// Lines scrolled per wheel notch.
    pub wheel_lines: u32,
    pub can_scroll_horizontally: bool,
    pub can_scroll_vertically: bool,
    /// Offset requested before the first measure pass. It is clamped once an extent is known.
    pub initial_offset: Offset,
    pub on_scroll_info_changed: Option<OnScrollInfoChanged>,
    pub on_invalidate_measure: Option<OnInvalidateMeasure>,
}

impl Clone for LayoutOptions {
    fn clone(&self) -> Self {
        Self {
            item_height: self.item_height,
            horizontal_line: self.horizontal_line,
            wheel_lines: self.wheel_lines,
            can_scroll_horizontally: self.can_scroll_horizontally,
            can_scroll_vertically: self.can_scroll_vertically,
            initial_offset: self.initial_offset,
            on_scroll_info_changed: self.on_scroll_info_changed.clone(),
            on_invalidate_measure: self.on_invalidate_measure.clone(),
        }
    }
}

impl LayoutOptions {
    pub fn new(item_height: f64) -> Self {
        Self {
            item_height,
            horizontal_line: DEFAULT_HORIZONTAL_LINE,
            wheel_lines: DEFAULT_WHEEL_LINES,
            can_scroll_horizontally: true,
            can_scroll_vertically: true,
            initial_offset: Offset::ZERO,
            on_scroll_info_changed: None,
            on_invalidate_measure: None,
        }
    }

    /// Returns `true` when `item_height` can drive virtualization.
    pub fn has_valid_item_height(&self) -> bool {
        self.item_height.is_finite() && self.item_height > 0.0
    }

    pub fn with_item_height(mut self, item_height: f64) -> Self {
        self.item_height = item_height;
        self
    }

    pub fn with_horizontal_line(mut self, horizontal_line: f64) -> Self {
        self.horizontal_line = horizontal_line;
        self
    }

    pub fn with_wheel_lines(mut self, wheel_lines: u32) -> Self {
        self.wheel_lines = wheel_lines;
        self
    }

    pub fn with_scroll_axes(mut self, horizontal: bool, vertical: bool) -> Self {
        self.can_scroll_horizontally = horizontal;
        self.can_scroll_vertically = vertical;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: Offset) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_on_scroll_info_changed(
        mut self,
        f: Option<impl Fn(ScrollInfo) + Send + Sync + 'static>,
    ) -> Self {
        self.on_scroll_info_changed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_invalidate_measure(
        mut self,
        f: Option<impl Fn() + Send + Sync + 'static>,
    ) -> Self {
        self.on_invalidate_measure = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("item_height", &self.item_height)
            .field("horizontal_line", &self.horizontal_line)
            .field("wheel_lines", &self.wheel_lines)
            .field("can_scroll_horizontally", &self.can_scroll_horizontally)
            .field("can_scroll_vertically", &self.can_scroll_vertically)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
