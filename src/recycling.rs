use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{ContainerGenerator, Generated, GeneratorError, ItemsChange, Rect, Size};

/// Handle to a container owned by a [`RecyclingGenerator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Realized for the item at this index.
    Realized(usize),
    /// Its item was removed, replaced or moved; waiting for the layout to release it.
    Detached,
    /// In the recycle queue.
    Recycled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerSlot {
    pub state: SlotState,
    /// Index the container was last prepared (bound) for.
    pub bound_to: Option<usize>,
    pub desired: Size,
    pub rect: Option<Rect>,
}

/// Counters for how containers were produced (diagnostic only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorStats {
    pub created: usize,
    pub reused: usize,
    pub released: usize,
}

pub type MeasureItem<T> = Arc<dyn Fn(&T, Size) -> Size + Send + Sync>;

/// An in-memory container generation facility over a `Vec` of items.
///
/// Containers live in an arena addressed by [`ContainerId`]; released containers go to a recycle
/// queue and are handed out again before new ones are created. Collection mutations go through
/// this type so it can keep its own `index → container` map in step, and each returns the
/// [`ItemsChange`] to forward to the layout.
pub struct RecyclingGenerator<T> {
    items: Vec<T>,
    version: u64,
    slots: Vec<ContainerSlot>,
    recycled: Vec<ContainerId>,
    realized: BTreeMap<usize, ContainerId>,
    measure_item: MeasureItem<T>,
    stats: GeneratorStats,
}

impl<T> RecyclingGenerator<T> {
    /// Creates a generator whose containers stretch to the size they are offered.
    pub fn new(items: Vec<T>) -> Self {
        Self::with_measure(items, |_, available| available)
    }

    pub fn with_measure(
        items: Vec<T>,
        measure_item: impl Fn(&T, Size) -> Size + Send + Sync + 'static,
    ) -> Self {
        Self {
            items,
            version: 0,
            slots: Vec::new(),
            recycled: Vec::new(),
            realized: BTreeMap::new(),
            measure_item: Arc::new(measure_item),
            stats: GeneratorStats::default(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The item a container currently represents.
    pub fn item_for(&self, container: ContainerId) -> Option<&T> {
        match self.slot(container)?.state {
            SlotState::Realized(index) => self.items.get(index),
            _ => None,
        }
    }

    pub fn slot(&self, container: ContainerId) -> Option<&ContainerSlot> {
        self.slots.get(container.0)
    }

    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    /// Number of containers ever created (realized, detached or recycled).
    pub fn container_count(&self) -> usize {
        self.slots.len()
    }

    pub fn realized_len(&self) -> usize {
        self.realized.len()
    }

    pub fn recycled_len(&self) -> usize {
        self.recycled.len()
    }

    pub fn push(&mut self, item: T) -> ItemsChange {
        let index = self.items.len();
        self.insert(index, item)
    }

    pub fn insert(&mut self, index: usize, item: T) -> ItemsChange {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.shift_from(index, 1, true);
        self.bump();
        ItemsChange::Insert { index, count: 1 }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) -> ItemsChange {
        let index = self.items.len();
        self.items.extend(items);
        let count = self.items.len() - index;
        self.bump();
        ItemsChange::Insert { index, count }
    }

    /// Removes `count` items starting at `index` (clamped to the collection).
    pub fn remove_range(&mut self, index: usize, count: usize) -> ItemsChange {
        let start = index.min(self.items.len());
        let end = index.saturating_add(count).min(self.items.len());
        self.items.drain(start..end);
        self.detach_span(start, end);
        self.shift_from(end, end - start, false);
        self.bump();
        ItemsChange::Remove {
            index: start,
            count: end - start,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<(T, ItemsChange)> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.detach_span(index, index + 1);
        self.shift_from(index + 1, 1, false);
        self.bump();
        Some((item, ItemsChange::Remove { index, count: 1 }))
    }

    pub fn replace(&mut self, index: usize, item: T) -> Option<(T, ItemsChange)> {
        let old = core::mem::replace(self.items.get_mut(index)?, item);
        self.detach_span(index, index + 1);
        self.bump();
        Some((old, ItemsChange::Replace { index, count: 1 }))
    }

    /// Moves the item at `from` so it ends up at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Option<ItemsChange> {
        let len = self.items.len();
        if from >= len || to >= len {
            return None;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.detach_span(from.min(to), from.max(to) + 1);
        self.bump();
        Some(ItemsChange::Move { from, to, count: 1 })
    }

    /// Replaces the whole collection.
    pub fn reset(&mut self, items: Vec<T>) -> ItemsChange {
        self.items = items;
        self.detach_span(0, usize::MAX);
        self.bump();
        ItemsChange::Reset
    }

    pub fn clear(&mut self) -> ItemsChange {
        self.reset(Vec::new())
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn detach_span(&mut self, start: usize, end: usize) {
        let mut span = self.realized.split_off(&start);
        let mut after = span.split_off(&end);
        self.realized.append(&mut after);
        for (_, id) in span {
            self.slots[id.0].state = SlotState::Detached;
        }
    }

    /// Re-keys realized containers at or after `from` by `by` (forward or back).
    fn shift_from(&mut self, from: usize, by: usize, forward: bool) {
        let tail = self.realized.split_off(&from);
        for (index, id) in tail {
            let next = if forward {
                index.saturating_add(by)
            } else {
                index - by
            };
            self.slots[id.0].state = SlotState::Realized(next);
            self.realized.insert(next, id);
        }
    }
}

impl<T> ContainerGenerator for RecyclingGenerator<T> {
    type Container = ContainerId;

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn items_version(&self) -> u64 {
        self.version
    }

    fn generate_or_reuse(
        &mut self,
        index: usize,
    ) -> Result<Generated<ContainerId>, GeneratorError> {
        let count = self.items.len();
        if index >= count {
            return Err(GeneratorError::OutOfBounds { index, count });
        }
        if let Some(&container) = self.realized.get(&index) {
            return Ok(Generated {
                container,
                is_new: false,
            });
        }

        let container = match self.recycled.pop() {
            Some(id) => {
                self.stats.reused += 1;
                id
            }
            None => {
                self.stats.created += 1;
                self.slots.push(ContainerSlot {
                    state: SlotState::Recycled,
                    bound_to: None,
                    desired: Size::ZERO,
                    rect: None,
                });
                ContainerId(self.slots.len() - 1)
            }
        };
        self.slots[container.0].state = SlotState::Realized(index);
        self.realized.insert(index, container);
        Ok(Generated {
            container,
            is_new: true,
        })
    }

    fn prepare(&mut self, container: &ContainerId, index: usize) {
        if let Some(slot) = self.slots.get_mut(container.0) {
            slot.bound_to = Some(index);
        }
    }

    fn release(&mut self, _index: usize, container: ContainerId) {
        let Some(slot) = self.slots.get_mut(container.0) else {
            return;
        };
        match slot.state {
            SlotState::Recycled => return,
            SlotState::Realized(i) => {
                if self.realized.get(&i) == Some(&container) {
                    self.realized.remove(&i);
                }
            }
            SlotState::Detached => {}
        }
        slot.state = SlotState::Recycled;
        slot.bound_to = None;
        slot.rect = None;
        self.recycled.push(container);
        self.stats.released += 1;
    }

    fn index_of(&self, container: &ContainerId) -> Option<usize> {
        match self.slots.get(container.0)?.state {
            SlotState::Realized(index) => Some(index),
            _ => None,
        }
    }

    fn measure_container(&mut self, container: &ContainerId, available: Size) -> Size {
        let Some(SlotState::Realized(index)) = self.slots.get(container.0).map(|s| s.state) else {
            return Size::ZERO;
        };
        let desired = match self.items.get(index) {
            Some(item) => (self.measure_item)(item, available),
            None => Size::ZERO,
        };
        self.slots[container.0].desired = desired;
        desired
    }

    fn arrange_container(&mut self, container: &ContainerId, rect: Rect) {
        if let Some(slot) = self.slots.get_mut(container.0) {
            slot.rect = Some(rect);
        }
    }
}

impl<T> core::fmt::Debug for RecyclingGenerator<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecyclingGenerator")
            .field("items", &self.items.len())
            .field("version", &self.version)
            .field("containers", &self.slots.len())
            .field("realized", &self.realized.len())
            .field("recycled", &self.recycled.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
