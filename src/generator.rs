use crate::{Generated, GeneratorError, Rect, Size};

/// The container generation facility the layout drives.
///
/// Implementations own the containers (visual wrappers bound to one item each) and the mapping
/// between containers and item indexes. The layout only holds `Container` handles, so those are
/// expected to be cheap to clone and comparable (ids, `Rc`s, entity keys, ...).
///
/// Contract:
/// - `generate_or_reuse(i)` returns the container currently realized for `i`, or creates/recycles
///   one and marks it `is_new`.
/// - After `generate_or_reuse(i)` returned `c`, `index_of(&c)` must be `Some(i)` until `c` is
///   released or the collection changes.
/// - `items_version` must change whenever the underlying collection is mutated.
pub trait ContainerGenerator {
    type Container: Clone + PartialEq + core::fmt::Debug;

    fn item_count(&self) -> usize;

    /// A counter bumped on every collection mutation.
    fn items_version(&self) -> u64;

    fn generate_or_reuse(
        &mut self,
        index: usize,
    ) -> Result<Generated<Self::Container>, GeneratorError>;

    /// Binds a freshly generated container to the item at `index`.
    fn prepare(&mut self, container: &Self::Container, index: usize);

    /// Hands a container back to the facility.
    ///
    /// `index` is the position the layout last realized it at; it may be stale when the
    /// collection changed in between.
    fn release(&mut self, index: usize, container: Self::Container);

    fn index_of(&self, container: &Self::Container) -> Option<usize>;

    fn measure_container(&mut self, container: &Self::Container, available: Size) -> Size;

    fn arrange_container(&mut self, container: &Self::Container, rect: Rect);
}
