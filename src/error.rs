use core::fmt;

/// Error returned by strict adapter reads.
///
/// Mutations never return this: a rejected mutation reports `false` and
/// leaves the container untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    /// A positional read addressed an element past the end of the list.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The list length at the time of the read.
        len: usize,
    },
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
        }
    }
}

impl std::error::Error for AdapterError {}
