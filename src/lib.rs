//! A headless virtualizing layout for lists whose items share one fixed height.
//!
//! The layout realizes containers only for the items inside the viewport, recycles the rest, and
//! implements the scroll-unit protocol (line, page, wheel, direct offset) a scroll host needs. It
//! is UI-agnostic. A host is expected to provide:
//! - a [`ContainerGenerator`] that creates, binds, measures and arranges containers
//! - the available size for each measure/arrange pass
//! - item collection change notices ([`ItemsChange`])
//!
//! [`RecyclingGenerator`] is a ready-made in-memory generator for hosts whose containers are
//! plain handles.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod generator;
mod layout;
mod options;
mod recycling;
mod state;
mod types;


pub use error::{GeneratorError, LayoutError, MismatchDetail};
pub use generator::ContainerGenerator;
pub use layout::{FixedStackLayout, visible_range_for};
pub use options::{
    DEFAULT_HORIZONTAL_LINE, DEFAULT_WHEEL_LINES, LayoutOptions, OnInvalidateMeasure,
    OnScrollInfoChanged,
};
pub use recycling::{
    ContainerId, ContainerSlot, GeneratorStats, MeasureItem, RecyclingGenerator, SlotState,
};
pub use state::{ScrollInfo, ScrollState};
pub use types::{Align, Generated, ItemsChange, Offset, Rect, Size, VisibleRange};
