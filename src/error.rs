use core::fmt;

/// Errors surfaced by a [`crate::ContainerGenerator`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("index {index} is out of bounds for {count} items")]
    OutOfBounds { index: usize, count: usize },
    #[error("container is not owned by this generator")]
    UnknownContainer,
}

/// Errors that abort a layout pass.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The pool and the generation facility disagree about which container represents an index.
    ///
    /// This is a bookkeeping bug, not a runtime condition: the pass is abandoned.
    #[error("container pool out of sync at index {index}: {detail}")]
    PoolMismatch { index: usize, detail: MismatchDetail },
    #[error("container generation failed: {0}")]
    Generator(#[from] GeneratorError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MismatchDetail {
    /// The pool already holds a different container for the index.
    ReplacedContainer,
    /// The facility maps the returned container to another index (or to none).
    ForeignIndex(Option<usize>),
}

impl fmt::Display for MismatchDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReplacedContainer => f.write_str("facility returned a different container"),
            Self::ForeignIndex(Some(other)) => {
                write!(f, "facility reports the container at index {other}")
            }
            Self::ForeignIndex(None) => f.write_str("facility does not track the container"),
        }
    }
}
