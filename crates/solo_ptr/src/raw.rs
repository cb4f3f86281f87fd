use core::alloc::Layout;
use core::mem;
use core::ptr::NonNull;

use alloc::alloc::{alloc, dealloc};

use crate::AllocError;

// -----------------------------------------------------------------------------
// RawSlot

/// Uninitialized heap storage for exactly one `T`.
///
/// The storage is compatible with `Box<T>`: it comes from the global allocator
/// with `Layout::new::<T>()`, and zero-sized types use a dangling pointer.
///
/// If the slot is dropped before [`write`](Self::write), the storage is
/// returned to the allocator without dropping any `T`. This is what keeps a
/// failing or panicking constructor from leaking.
pub(crate) struct RawSlot<T> {
    ptr: NonNull<T>,
}

impl<T> RawSlot<T> {
    const LAYOUT: Layout = Layout::new::<T>();

    /// Reserves storage for one `T`.
    pub fn allocate() -> Result<Self, AllocError> {
        if Self::LAYOUT.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
            });
        }

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc(Self::LAYOUT) };

        match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => Ok(Self { ptr }),
            None => {
                let err = AllocError::from(Self::LAYOUT);
                log::warn!("RawSlot::allocate -> {err}");
                Err(err)
            }
        }
    }

    /// Moves `value` into the slot and hands the initialized storage out.
    ///
    /// The returned pointer can be given to `Box::from_raw`.
    #[inline]
    pub fn write(self, value: T) -> NonNull<T> {
        let ptr = self.ptr;
        mem::forget(self);
        // SAFETY: `ptr` is valid for writes and properly aligned for `T`.
        unsafe { ptr.as_ptr().write(value) };
        ptr
    }
}

impl<T> Drop for RawSlot<T> {
    fn drop(&mut self) {
        if Self::LAYOUT.size() != 0 {
            // SAFETY: the storage was allocated in `allocate` with the same
            // layout and has not been handed out.
            unsafe { dealloc(self.ptr.as_ptr().cast::<u8>(), Self::LAYOUT) };
        }
    }
}
