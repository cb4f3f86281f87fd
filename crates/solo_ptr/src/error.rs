use core::alloc::Layout;
use core::convert::Infallible;

use thiserror::Error;

// -----------------------------------------------------------------------------
// AllocError

/// The global allocator could not provide storage for a value.
///
/// Returned by the fallible constructors such as
/// [`ExclusiveOwner::try_new`](crate::ExclusiveOwner::try_new).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("failed to allocate {} bytes with alignment {}", .layout.size(), .layout.align())]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    /// The layout of the failed request.
    #[inline]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of bytes requested.
    #[inline]
    pub const fn size(&self) -> usize {
        self.layout.size()
    }

    /// Alignment requested.
    #[inline]
    pub const fn align(&self) -> usize {
        self.layout.align()
    }
}

impl From<Layout> for AllocError {
    #[inline]
    fn from(layout: Layout) -> Self {
        Self { layout }
    }
}

// -----------------------------------------------------------------------------
// ConstructError

/// Failure of [`ExclusiveOwner::try_new_with`](crate::ExclusiveOwner::try_new_with).
///
/// In both cases the reserved storage has already been returned to the
/// allocator when this error is observed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConstructError<E> {
    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error("value construction failed: {0}")]
    Construct(E),
}

impl<E> ConstructError<E> {
    /// Returns the constructor's error, if construction was reached.
    #[inline]
    pub fn into_construct(self) -> Option<E> {
        match self {
            Self::Alloc(_) => None,
            Self::Construct(e) => Some(e),
        }
    }
}

impl From<ConstructError<Infallible>> for AllocError {
    #[inline]
    fn from(value: ConstructError<Infallible>) -> Self {
        match value {
            ConstructError::Alloc(e) => e,
            ConstructError::Construct(never) => match never {},
        }
    }
}
