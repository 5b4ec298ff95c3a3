use crate::{Offset, Size};

/// A snapshot of everything a scroll host needs to size and position its scrollbars.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollInfo {
    pub offset: Offset,
    pub viewport: Size,
    pub extent: Size,
}

impl ScrollInfo {
    pub fn max_offset(&self) -> Offset {
        Offset {
            x: (self.extent.width - self.viewport.width).max(0.0),
            y: (self.extent.height - self.viewport.height).max(0.0),
        }
    }
}

/// The part of [`ScrollInfo`] worth persisting across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub offset: Offset,
}
