use core::{alloc::Layout, fmt};

/// Errors reported by the fallible (`try_*`, `at`) operations of
/// [`SmallVector`](crate::SmallVector).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A checked access or insertion named a position past the live elements.
    OutOfRange {
        /// The requested position.
        index: usize,
        /// The number of live elements at the time of the request.
        len: usize,
    },

    /// The requested capacity overflows `usize` or exceeds `isize::MAX` bytes.
    CapacityOverflow,

    /// The allocator refused to hand out a block.
    AllocFailed {
        /// The layout that was passed to the allocator.
        layout: Layout,
    },
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::AllocFailed { layout } => write!(
                f,
                "memory allocation of {} bytes (align {}) failed",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl core::error::Error for Error {}

/// Unwraps the result of an allocating operation, aborting the way `Vec` does.
#[inline]
#[track_caller]
pub(crate) fn infallible<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(value) => value,
        Err(Error::AllocFailed { layout }) => alloc::alloc::handle_alloc_error(layout),
        Err(Error::CapacityOverflow) => panic!("capacity overflow"),
        Err(err @ Error::OutOfRange { .. }) => panic!("{err}"),
    }
}
