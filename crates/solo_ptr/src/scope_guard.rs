use core::fmt;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use core::ptr;

// -----------------------------------------------------------------------------
// ScopeGuard

/// Runs a closer on a borrowed resource when it goes out of scope.
///
/// Unlike [`ExclusiveOwner`](crate::ExclusiveOwner), the guard does not own
/// the resource. It owns the obligation to close it: the closer runs exactly
/// once, on every exit path including unwinding, unless the guard is
/// [dismissed](Self::dismiss).
///
/// Created by [`make_raii`].
#[must_use = "the closer runs immediately if the guard is not bound"]
pub struct ScopeGuard<'a, R: ?Sized, F: FnOnce(&mut R)> {
    resource: &'a mut R,
    closer: ManuallyDrop<F>,
}

/// Guards `resource` with `closer`.
///
/// # Examples
///
/// ```
/// use solo_ptr::make_raii;
///
/// struct Stream {
///     name: &'static str,
///     open: bool,
/// }
///
/// let mut stream = Stream { name: "dev1", open: true };
/// {
///     let guard = make_raii(&mut stream, |s| s.open = false);
///     assert_eq!(guard.name, "dev1");
///     assert!(guard.open);
/// }
/// assert!(!stream.open);
/// ```
#[inline]
pub fn make_raii<R: ?Sized, F: FnOnce(&mut R)>(resource: &mut R, closer: F) -> ScopeGuard<'_, R, F> {
    ScopeGuard {
        resource,
        closer: ManuallyDrop::new(closer),
    }
}

impl<'a, R: ?Sized, F: FnOnce(&mut R)> ScopeGuard<'a, R, F> {
    /// Disarms the guard and returns the borrowed resource.
    ///
    /// The closer is dropped without being called.
    ///
    /// This is an associated function so it does not shadow methods of `R`.
    pub fn dismiss(guard: Self) -> &'a mut R {
        let mut guard = ManuallyDrop::new(guard);
        // SAFETY: `guard` is never dropped, so each field is taken exactly once.
        unsafe {
            ManuallyDrop::drop(&mut guard.closer);
            ptr::read(&guard.resource)
        }
    }
}

impl<R: ?Sized, F: FnOnce(&mut R)> Drop for ScopeGuard<'_, R, F> {
    fn drop(&mut self) {
        // SAFETY: `closer` is only taken here or in `dismiss`, which skips `drop`.
        let closer = unsafe { ManuallyDrop::take(&mut self.closer) };
        closer(&mut *self.resource);
    }
}

impl<R: ?Sized, F: FnOnce(&mut R)> Deref for ScopeGuard<'_, R, F> {
    type Target = R;

    #[inline]
    fn deref(&self) -> &R {
        &*self.resource
    }
}

impl<R: ?Sized, F: FnOnce(&mut R)> DerefMut for ScopeGuard<'_, R, F> {
    #[inline]
    fn deref_mut(&mut self) -> &mut R {
        &mut *self.resource
    }
}

impl<R: ?Sized + fmt::Debug, F: FnOnce(&mut R)> fmt::Debug for ScopeGuard<'_, R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}
