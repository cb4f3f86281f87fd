use core::ptr::NonNull;

use alloc::boxed::Box;

// -----------------------------------------------------------------------------
// Deleter

/// The teardown strategy of an [`ExclusiveOwner`](crate::ExclusiveOwner).
///
/// The owner calls [`delete`](Self::delete) exactly once for every instance
/// it held, when the instance is dropped, reset or replaced. Instances given
/// up through `release` are never passed to the deleter.
///
/// Every `FnMut(NonNull<T>)` closure is a deleter, which allows owners that
/// close handles or return values to a pool instead of freeing them.
///
/// # Examples
///
/// ```
/// use core::ptr::NonNull;
/// use solo_ptr::ExclusiveOwner;
///
/// struct Stream {
///     closed: bool,
/// }
///
/// let mut stream = Stream { closed: false };
/// let closer = |s: NonNull<Stream>| unsafe { (*s.as_ptr()).closed = true };
///
/// // SAFETY: `stream` outlives the owner and the closer does not free it.
/// let owner = unsafe { ExclusiveOwner::with_deleter(&raw mut stream, closer) };
/// drop(owner);
///
/// assert!(stream.closed);
/// ```
pub trait Deleter<T: ?Sized> {
    /// Tears down the instance behind `ptr`.
    ///
    /// # Safety
    ///
    /// - `ptr` must be the pointer this deleter was paired with.
    /// - It must not be used again after this call.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

impl<T: ?Sized, F: FnMut(NonNull<T>)> Deleter<T> for F {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        self(ptr)
    }
}

// -----------------------------------------------------------------------------
// DefaultDelete

/// Drops the instance and returns its storage to the global allocator,
/// exactly as dropping a `Box<T>` does.
///
/// This is the deleter of owners built through `new`, `From<Box<T>>`,
/// `from_vec` and the other safe constructors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultDelete;

impl<T: ?Sized> Deleter<T> for DefaultDelete {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: the owner only pairs `DefaultDelete` with pointers
        // obtained from `Box` or with a `Box`-compatible allocation.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }
}
