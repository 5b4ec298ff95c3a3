use std::cell::Cell;
use std::collections::BTreeMap;

use crate::{
    Align, ContainerGenerator, ItemsChange, LayoutError, LayoutOptions, MismatchDetail, Offset,
    Rect, ScrollInfo, ScrollState, Size, VisibleRange,
};

/// A virtualizing layout for lists whose items all share one height.
///
/// The layout holds no UI objects of its own:
/// - Containers are created, bound, measured and arranged through a [`ContainerGenerator`]
///   passed into every pass; the layout only keeps an `index → container` pool of handles.
/// - Scroll state (offset, viewport, extent) lives here and is reported through
///   [`LayoutOptions::on_scroll_info_changed`].
/// - The layout never re-measures by itself. When a pass is needed it raises
///   [`LayoutOptions::on_invalidate_measure`] and reports [`Self::needs_measure`].
///
/// Every operation takes `&mut self`, so a pass always runs to completion (including container
/// cleanup) before the next one can start.
#[derive(Debug)]
pub struct FixedStackLayout<C> {
    options: LayoutOptions,
    offset: Offset,
    viewport: Size,
    extent: Size,
    item_count: usize,
    pending_offset: Option<Offset>,

    pool: BTreeMap<usize, C>,
    needs_measure: bool,
    pass_through: bool,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<C: Clone + PartialEq + core::fmt::Debug> FixedStackLayout<C> {
    pub fn new(options: LayoutOptions) -> Self {
        vdebug!(
            item_height = options.item_height,
            valid = options.has_valid_item_height(),
            "FixedStackLayout::new"
        );
        let pending_offset =
            (options.initial_offset != Offset::ZERO).then_some(options.initial_offset);
        Self {
            offset: Offset::ZERO,
            viewport: Size::ZERO,
            extent: Size::ZERO,
            item_count: 0,
            pending_offset,
            pool: BTreeMap::new(),
            needs_measure: true,
            pass_through: !options.has_valid_item_height(),
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        let height_changed = self.options.item_height.to_bits() != options.item_height.to_bits();
        self.options = options;
        vtrace!(
            item_height = self.options.item_height,
            height_changed,
            "FixedStackLayout::set_options"
        );

        let clamped = self.clamp_offset(self.offset);
        if clamped != self.offset {
            self.offset = clamped;
            self.notify();
            self.request_measure();
        } else if height_changed {
            self.request_measure();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut LayoutOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn item_height(&self) -> f64 {
        self.options.item_height
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn extent(&self) -> Size {
        self.extent
    }

    /// Item count seen by the last measure pass.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn scroll_info(&self) -> ScrollInfo {
        ScrollInfo {
            offset: self.offset,
            viewport: self.viewport,
            extent: self.extent,
        }
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            offset: self.offset,
        }
    }

    /// Restores a previously captured scroll position.
    ///
    /// Before the first measure pass the extent is unknown, so the offset is kept and clamped
    /// once the pass has computed one.
    pub fn restore_scroll_state(&mut self, state: ScrollState) {
        if self.extent == Size::ZERO && self.item_count == 0 {
            self.pending_offset = Some(state.offset);
            self.request_measure();
            return;
        }
        self.set_scroll_offset(state.offset.x, state.offset.y);
    }

    pub fn needs_measure(&self) -> bool {
        self.needs_measure
    }

    /// `true` while the item height is unusable and the layout realizes nothing.
    pub fn is_pass_through(&self) -> bool {
        self.pass_through
    }

    pub fn realized_count(&self) -> usize {
        self.pool.len()
    }

    /// Realized indexes in ascending order.
    pub fn realized_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.pool.keys().copied()
    }

    pub fn container_for(&self, index: usize) -> Option<&C> {
        self.pool.get(&index)
    }

    /// The index range the current offset and viewport cover.
    pub fn visible_range(&self) -> VisibleRange {
        if !self.options.has_valid_item_height() {
            return VisibleRange::EMPTY;
        }
        visible_range_for(
            self.offset.y,
            self.viewport.height,
            self.item_count,
            self.options.item_height,
        )
    }

    /// Batches multiple updates into a single scroll-info notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.begin_batch();
        f(self);
        self.end_batch();
    }

    /// Measures the layout against `available`, realizing containers for the visible items and
    /// releasing every other one.
    ///
    /// Returns the desired size: the widest realized container by the available height. The full
    /// logical height is only reported through [`Self::extent`].
    pub fn measure<G>(&mut self, generator: &mut G, available: Size) -> Result<Size, LayoutError>
    where
        G: ContainerGenerator<Container = C>,
    {
        self.begin_batch();
        let result = self.measure_inner(generator, available);
        self.end_batch();
        result
    }

    fn measure_inner<G>(&mut self, generator: &mut G, available: Size) -> Result<Size, LayoutError>
    where
        G: ContainerGenerator<Container = C>,
    {
        self.needs_measure = false;

        if !self.options.has_valid_item_height() {
            if !self.pass_through {
                vwarn!(
                    item_height = self.options.item_height,
                    "invalid item height, virtualization disabled"
                );
            }
            self.pass_through = true;
            self.release_all(generator);
            return Ok(available);
        }
        self.pass_through = false;

        let item_height = self.options.item_height;
        let count = generator.item_count();
        let version = generator.items_version();
        self.item_count = count;

        let extent_height = count as f64 * item_height;
        let viewport = Size {
            width: finite_or(available.width, self.extent.width),
            height: finite_or(available.height, extent_height),
        };
        let extent = Size {
            width: if count == 0 { 0.0 } else { self.extent.width },
            height: extent_height,
        };
        self.apply_geometry(viewport, extent);

        let range = self.visible_range();
        vtrace!(
            count,
            offset_y = self.offset.y,
            start = range.start_index,
            end = range.end_index,
            "measure"
        );

        let child_available = Size::new(available.width, item_height);
        let mut desired_width = 0.0f64;
        for index in range.start_index..range.end_index {
            let generated = generator.generate_or_reuse(index)?;

            if generator.items_version() != version {
                vdebug!(index, "items changed during generation, restarting measure");
                generator.release(index, generated.container);
                self.release_all(generator);
                self.request_measure();
                return Ok(Size::new(0.0, finite_or(available.height, 0.0)));
            }

            let mismatch = match self.pool.get(&index) {
                Some(existing) if *existing != generated.container => {
                    Some(MismatchDetail::ReplacedContainer)
                }
                _ => match generator.index_of(&generated.container) {
                    Some(i) if i == index => None,
                    other => Some(MismatchDetail::ForeignIndex(other)),
                },
            };
            if let Some(detail) = mismatch {
                let container = generated.container;
                return Err(self.abort_mismatch(generator, index, container, range, detail));
            }

            if generated.is_new {
                generator.prepare(&generated.container, index);
            }
            let desired = generator.measure_container(&generated.container, child_available);
            desired_width = desired_width.max(desired.width);
            self.pool.insert(index, generated.container);
        }

        self.release_outside(generator, range);

        let extent_width = if count == 0 {
            0.0
        } else if available.width.is_finite() {
            desired_width.max(available.width)
        } else {
            desired_width
        };
        let viewport = Size {
            width: finite_or(available.width, extent_width),
            height: self.viewport.height,
        };
        self.apply_geometry(
            viewport,
            Size {
                width: extent_width,
                height: extent_height,
            },
        );
        self.pending_offset = None;

        Ok(Size::new(desired_width, finite_or(available.height, extent_height)))
    }

    /// Positions the realized containers for `final_size` and returns it.
    pub fn arrange<G>(&mut self, generator: &mut G, final_size: Size) -> Size
    where
        G: ContainerGenerator<Container = C>,
    {
        if self.pool.is_empty() || !self.options.has_valid_item_height() {
            self.batch_update(|layout| layout.apply_geometry(final_size, Size::ZERO));
            return final_size;
        }

        let viewport = Size {
            width: finite_or(final_size.width, self.viewport.width),
            height: finite_or(final_size.height, self.viewport.height),
        };
        let extent = self.extent;
        let offset = self.offset;
        self.batch_update(|layout| layout.apply_geometry(viewport, extent));
        if self.offset != offset {
            // The pool still holds the range measured for the old offset.
            self.request_measure();
        }

        let item_height = self.options.item_height;
        let width = final_size.width.max(self.extent.width);
        for (&index, container) in &self.pool {
            let rect = Rect {
                x: -self.offset.x,
                y: index as f64 * item_height - self.offset.y,
                width,
                height: item_height,
            };
            generator.arrange_container(container, rect);
        }
        final_size
    }

    /// Notifies the layout that the items collection changed.
    ///
    /// Containers whose item moved, vanished or was replaced are released right away; the rest
    /// of the pool follows the shifted indexes. A new measure pass is requested but not run.
    pub fn on_items_changed<G>(&mut self, generator: &mut G, change: ItemsChange)
    where
        G: ContainerGenerator<Container = C>,
    {
        vdebug!(?change, realized = self.pool.len(), "on_items_changed");
        match change {
            ItemsChange::Reset => {
                self.release_all(generator);
                self.item_count = 0;
                self.batch_update(|layout| layout.apply_geometry(Size::ZERO, Size::ZERO));
            }
            ItemsChange::Insert { index, count } => {
                let tail = self.pool.split_off(&index);
                self.pool
                    .extend(tail.into_iter().map(|(i, c)| (i.saturating_add(count), c)));
            }
            ItemsChange::Remove { index, count } => {
                let end = index.saturating_add(count);
                self.release_span(generator, index, end);
                let tail = self.pool.split_off(&end);
                self.pool.extend(tail.into_iter().map(|(i, c)| (i - count, c)));
            }
            ItemsChange::Replace { index, count } => {
                self.release_span(generator, index, index.saturating_add(count));
            }
            ItemsChange::Move { from, to, count } => {
                let start = from.min(to);
                let end = from.max(to).saturating_add(count);
                self.release_span(generator, start, end);
            }
        }
        self.request_measure();
    }

    /// Sets the scroll offset, clamped to the scrollable area.
    ///
    /// Returns `true` when the offset changed (a measure pass is then requested).
    pub fn set_scroll_offset(&mut self, x: f64, y: f64) -> bool {
        let clamped = self.clamp_offset(Offset { x, y });
        if clamped == self.offset {
            return false;
        }
        vtrace!(x = clamped.x, y = clamped.y, "set_scroll_offset");
        self.offset = clamped;
        self.request_measure();
        self.notify();
        true
    }

    pub fn set_horizontal_offset(&mut self, x: f64) -> bool {
        self.set_scroll_offset(x, self.offset.y)
    }

    pub fn set_vertical_offset(&mut self, y: f64) -> bool {
        self.set_scroll_offset(self.offset.x, y)
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> bool {
        self.set_scroll_offset(self.offset.x + dx, self.offset.y + dy)
    }

    pub fn line_up(&mut self) -> bool {
        self.scroll_by(0.0, -self.line_height())
    }

    pub fn line_down(&mut self) -> bool {
        self.scroll_by(0.0, self.line_height())
    }

    pub fn line_left(&mut self) -> bool {
        self.scroll_by(-self.options.horizontal_line, 0.0)
    }

    pub fn line_right(&mut self) -> bool {
        self.scroll_by(self.options.horizontal_line, 0.0)
    }

    pub fn page_up(&mut self) -> bool {
        self.scroll_by(0.0, -self.page_height())
    }

    pub fn page_down(&mut self) -> bool {
        self.scroll_by(0.0, self.page_height())
    }

    pub fn page_left(&mut self) -> bool {
        self.scroll_by(-self.viewport.width, 0.0)
    }

    pub fn page_right(&mut self) -> bool {
        self.scroll_by(self.viewport.width, 0.0)
    }

    pub fn mouse_wheel_up(&mut self) -> bool {
        self.scroll_by(0.0, -self.wheel_height())
    }

    pub fn mouse_wheel_down(&mut self) -> bool {
        self.scroll_by(0.0, self.wheel_height())
    }

    pub fn mouse_wheel_left(&mut self) -> bool {
        self.scroll_by(-self.wheel_width(), 0.0)
    }

    pub fn mouse_wheel_right(&mut self) -> bool {
        self.scroll_by(self.wheel_width(), 0.0)
    }

    /// Scrolls vertically so the item at `index` becomes visible. Returns the applied offset.
    pub fn make_visible(&mut self, index: usize, align: Align) -> f64 {
        let y = self.scroll_to_index_offset(index, align);
        self.set_vertical_offset(y);
        self.offset.y
    }

    /// Computes the (clamped) vertical offset that brings `index` into view.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> f64 {
        if !self.options.has_valid_item_height() || self.item_count == 0 {
            return self.offset.y;
        }
        let item_height = self.options.item_height;
        let index = index.min(self.item_count - 1);
        let start = index as f64 * item_height;
        let end = start + item_height;
        let view = self.viewport.height;

        let target = match align {
            Align::Start => start,
            Align::End => end - view,
            Align::Center => start + item_height / 2.0 - view / 2.0,
            Align::Auto => {
                let cur = self.offset.y;
                if start >= cur && end <= cur + view {
                    cur
                } else if start < cur {
                    start
                } else {
                    end - view
                }
            }
        };
        self.clamp_offset(Offset::new(self.offset.x, target)).y
    }

    pub fn max_offset(&self) -> Offset {
        self.scroll_info().max_offset()
    }

    pub fn clamp_offset(&self, offset: Offset) -> Offset {
        let max = self.max_offset();
        Offset {
            x: clamp_axis(
                offset.x,
                self.offset.x,
                max.x,
                self.options.can_scroll_horizontally,
            ),
            y: clamp_axis(
                offset.y,
                self.offset.y,
                max.y,
                self.options.can_scroll_vertically,
            ),
        }
    }

    fn line_height(&self) -> f64 {
        if self.options.has_valid_item_height() {
            self.options.item_height
        } else {
            0.0
        }
    }

    fn page_height(&self) -> f64 {
        let item_height = self.line_height();
        if item_height == 0.0 {
            return 0.0;
        }
        let items = (self.viewport.height / item_height).floor().max(1.0);
        items * item_height
    }

    fn wheel_height(&self) -> f64 {
        self.line_height() * self.options.wheel_lines as f64
    }

    fn wheel_width(&self) -> f64 {
        self.options.horizontal_line * self.options.wheel_lines as f64
    }

    /// Stores viewport/extent, re-clamps the offset against them and notifies on change.
    ///
    /// A pending offset is clamped here but stays pending until a measure pass has computed the
    /// full extent.
    fn apply_geometry(&mut self, viewport: Size, extent: Size) {
        let prev = self.scroll_info();
        self.viewport = viewport;
        self.extent = extent;
        let wanted = self.pending_offset.unwrap_or(self.offset);
        self.offset = self.clamp_offset(wanted);
        if self.scroll_info() != prev {
            self.notify();
        }
    }

    fn request_measure(&mut self) {
        self.needs_measure = true;
        if let Some(cb) = &self.options.on_invalidate_measure {
            cb();
        }
    }

    fn release_span<G>(&mut self, generator: &mut G, start: usize, end: usize)
    where
        G: ContainerGenerator<Container = C>,
    {
        let mut span = self.pool.split_off(&start);
        let mut after = span.split_off(&end);
        self.pool.append(&mut after);
        for (index, container) in span {
            vtrace!(index, "release");
            generator.release(index, container);
        }
    }

    fn release_outside<G>(&mut self, generator: &mut G, keep: VisibleRange)
    where
        G: ContainerGenerator<Container = C>,
    {
        let tail = self.pool.split_off(&keep.end_index);
        let kept = self.pool.split_off(&keep.start_index);
        let head = core::mem::replace(&mut self.pool, kept);
        for (index, container) in head.into_iter().chain(tail) {
            vtrace!(index, "release");
            generator.release(index, container);
        }
    }

    /// Hands back a container the pass could not pool and drops entries outside `range`.
    fn abort_mismatch<G>(
        &mut self,
        generator: &mut G,
        index: usize,
        stray: C,
        range: VisibleRange,
        detail: MismatchDetail,
    ) -> LayoutError
    where
        G: ContainerGenerator<Container = C>,
    {
        if !self.pool.values().any(|c| *c == stray) {
            generator.release(index, stray);
        }
        self.release_outside(generator, range);
        pool_mismatch(index, detail)
    }

    fn release_all<G>(&mut self, generator: &mut G)
    where
        G: ContainerGenerator<Container = C>,
    {
        for (index, container) in core::mem::take(&mut self.pool) {
            vtrace!(index, "release");
            generator.release(index, container);
        }
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_scroll_info_changed {
            cb(self.scroll_info());
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    fn begin_batch(&self) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));
    }

    fn end_batch(&self) {
        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }
}

/// The index range covered by `[offset_y, offset_y + viewport_height)`.
///
/// A fractional `offset_y` starts at the item whose span covers it, so a partially scrolled top
/// item is always included.
pub fn visible_range_for(
    offset_y: f64,
    viewport_height: f64,
    count: usize,
    item_height: f64,
) -> VisibleRange {
    if count == 0 || !(item_height.is_finite() && item_height > 0.0) {
        return VisibleRange::EMPTY;
    }
    let offset_y = offset_y.max(0.0);
    let start = ((offset_y / item_height).floor() as usize).min(count);
    let end = (((offset_y + viewport_height.max(0.0)) / item_height).ceil() as usize)
        .clamp(start, count);
    VisibleRange {
        start_index: start,
        end_index: end,
    }
}

fn clamp_axis(value: f64, current: f64, max: f64, enabled: bool) -> f64 {
    if !enabled {
        return 0.0;
    }
    if value.is_nan() {
        return current.clamp(0.0, max);
    }
    value.clamp(0.0, max)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn pool_mismatch(index: usize, detail: MismatchDetail) -> LayoutError {
    vwarn!(index, %detail, "container pool out of sync with generator");
    LayoutError::PoolMismatch { index, detail }
}
