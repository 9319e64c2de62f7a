use core::fmt;

use super::Vector;

/// Registry errors.
///
/// `InvalidVector` means the vector wiring itself is wrong and is not
/// something to retry; the rest are misuse by the calling subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrError {
    /// Vector number outside `0..=MAX_VECTOR`.
    InvalidVector(usize),
    /// The record is already linked, on the given vector.
    AlreadyAttached(Vector),
    /// The record is not linked on the given vector.
    NotAttached(Vector),
    /// The record is not linked on any vector.
    Detached,
    /// The vector's chain is already held by this CPU: a handler touching its
    /// own vector, or a `for_each` visitor touching the chain it walks.
    Reentrant(Vector),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Caller,
}

impl IntrError {
    pub fn kind(self) -> ErrorKind {
        match self {
            Self::InvalidVector(_) => ErrorKind::Configuration,
            Self::AlreadyAttached(_)
            | Self::NotAttached(_)
            | Self::Detached
            | Self::Reentrant(_) => ErrorKind::Caller,
        }
    }

    pub fn as_errno(self) -> isize {
        match self {
            Self::InvalidVector(_) => -22,   // EINVAL
            Self::AlreadyAttached(_) => -16, // EBUSY
            Self::NotAttached(_) | Self::Detached => -2, // ENOENT
            Self::Reentrant(_) => -35,       // EDEADLK
        }
    }
}

impl fmt::Display for IntrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVector(n) => write!(f, "invalid interrupt vector {}", n),
            Self::AlreadyAttached(v) => write!(f, "handler already attached to vector {}", v),
            Self::NotAttached(v) => write!(f, "handler not attached to vector {}", v),
            Self::Detached => write!(f, "handler not attached"),
            Self::Reentrant(v) => write!(f, "chain of vector {} already held by this CPU", v),
        }
    }
}
