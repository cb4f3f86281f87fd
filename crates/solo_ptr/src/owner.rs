use core::alloc::Layout;
use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use alloc::alloc::handle_alloc_error;
use alloc::boxed::Box;

use crate::raw::RawSlot;
use crate::{AllocError, ConstructError, DefaultDelete, Deleter, debug};

// -----------------------------------------------------------------------------
// ExclusiveOwner

/// A pointer that is the only owner of its pointee.
///
/// An `ExclusiveOwner` is either empty or owns one instance (or one slice, see
/// the `[E]` impls). The instance is torn down by the deleter `D` exactly once:
/// when the owner is dropped, reset or assigned over.
///
/// # Ownership
///
/// - It cannot be cloned. Ownership moves with the value, and
///   [`take`](Self::take) moves it out of a place while leaving it empty.
/// - An instance given up with [`release`](Self::release) is no longer
///   owned and will never reach the deleter.
///
/// # Access
///
/// [`Deref`] panics on an empty owner. Use [`as_ref`](Self::as_ref) to check,
/// or [`as_ref_unchecked`](Self::as_ref_unchecked) when emptiness is ruled out
/// by other means.
///
/// # Examples
///
/// ```
/// use solo_ptr::ExclusiveOwner;
///
/// let mut a = ExclusiveOwner::new(String::from("ipad"));
/// assert!(a.is_owning());
///
/// let b = a.take();
/// assert!(a.is_empty());
/// assert_eq!(*b, "ipad");
/// ```
pub struct ExclusiveOwner<T: ?Sized, D: Deleter<T> = DefaultDelete> {
    ptr: Option<NonNull<T>>,
    deleter: D,
    _marker: PhantomData<T>,
}

// SAFETY: `ExclusiveOwner` owns its pointee like `Box` does.
unsafe impl<T: ?Sized + Send, D: Deleter<T> + Send> Send for ExclusiveOwner<T, D> {}

// SAFETY: shared access only hands out `&T` and `&D`.
unsafe impl<T: ?Sized + Sync, D: Deleter<T> + Sync> Sync for ExclusiveOwner<T, D> {}

impl<T: ?Sized, D: Deleter<T>> Drop for ExclusiveOwner<T, D> {
    #[inline]
    fn drop(&mut self) {
        self.drop_current();
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn empty_deref() -> ! {
    panic!("dereferenced an empty ExclusiveOwner")
}

impl<T: ?Sized, D: Deleter<T>> ExclusiveOwner<T, D> {
    #[inline]
    fn adopt(ptr: Option<NonNull<T>>, deleter: D) -> Self {
        if ptr.is_some() {
            debug::acquired();
        }
        Self {
            ptr,
            deleter,
            _marker: PhantomData,
        }
    }

    /// Leaves the owner empty without touching the pointee.
    #[inline]
    fn disown(&mut self) -> Option<NonNull<T>> {
        let ptr = self.ptr.take();
        if ptr.is_some() {
            debug::relinquished();
        }
        ptr
    }

    #[inline]
    fn drop_current(&mut self) {
        if let Some(ptr) = self.disown() {
            // SAFETY: `ptr` was owned by `self` and is now forgotten by it.
            unsafe { self.deleter.delete(ptr) };
        }
    }

    /// Creates an empty owner that will use `deleter`.
    #[inline]
    pub const fn empty_with(deleter: D) -> Self {
        Self {
            ptr: None,
            deleter,
            _marker: PhantomData,
        }
    }

    /// Takes ownership of `ptr`, to be torn down by `deleter`.
    ///
    /// A null `ptr` yields an empty owner.
    ///
    /// # Safety
    ///
    /// - If non-null, `ptr` must point to a valid instance that stays valid
    ///   until `deleter` is called on it.
    /// - No other owner may tear down `ptr`.
    /// - `deleter` must be able to tear down `ptr`.
    #[inline]
    pub unsafe fn with_deleter(ptr: *mut T, deleter: D) -> Self {
        Self::adopt(NonNull::new(ptr), deleter)
    }

    /// Returns `true` if the owner holds an instance.
    #[inline(always)]
    pub const fn is_owning(&self) -> bool {
        self.ptr.is_some()
    }

    /// Returns `true` if the owner holds nothing.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns the address of the owned instance without giving up ownership.
    #[inline(always)]
    pub const fn get(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Returns a reference to the owned instance, or `None` if empty.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: an owned pointer is valid and not aliased mutably.
        self.ptr.map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Returns a mutable reference to the owned instance, or `None` if empty.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: an owned pointer is valid and `&mut self` is exclusive.
        self.ptr.map(|mut ptr| unsafe { ptr.as_mut() })
    }

    /// Returns a reference to the owned instance without checking emptiness.
    ///
    /// # Safety
    ///
    /// The owner must not be empty.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub unsafe fn as_ref_unchecked(&self) -> &T {
        debug_assert!(self.is_owning(), "dereferenced an empty ExclusiveOwner");
        // SAFETY: the caller guarantees the owner is not empty.
        unsafe { self.ptr.unwrap_unchecked().as_ref() }
    }

    /// Returns a mutable reference to the owned instance without checking emptiness.
    ///
    /// # Safety
    ///
    /// The owner must not be empty.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub unsafe fn as_mut_unchecked(&mut self) -> &mut T {
        debug_assert!(self.is_owning(), "dereferenced an empty ExclusiveOwner");
        // SAFETY: the caller guarantees the owner is not empty.
        unsafe { self.ptr.unwrap_unchecked().as_mut() }
    }

    /// Gives up ownership without tearing the instance down.
    ///
    /// The owner is left empty. The caller becomes responsible for the
    /// returned instance, for example by passing it back to
    /// [`ExclusiveOwner::from_raw`].
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::ExclusiveOwner;
    ///
    /// let mut owner = ExclusiveOwner::new(42);
    /// let ptr = owner.release().unwrap();
    /// assert!(owner.is_empty());
    ///
    /// let owner = unsafe { ExclusiveOwner::from_raw(ptr.as_ptr()) };
    /// assert_eq!(*owner, 42);
    /// ```
    #[inline]
    #[must_use = "the released instance is leaked unless it is adopted again"]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        let ptr = self.disown();
        if let Some(ptr) = ptr {
            log::trace!("ExclusiveOwner released {ptr:p}");
        }
        ptr
    }

    /// Tears down the owned instance, if any, leaving the owner empty.
    #[inline]
    pub fn reset(&mut self) {
        self.drop_current();
    }

    /// Tears down the owned instance and adopts `ptr` instead.
    ///
    /// If `ptr` is the instance already owned, nothing happens.
    ///
    /// # Safety
    ///
    /// Same as [`with_deleter`](Self::with_deleter), for the deleter
    /// already stored in `self`.
    pub unsafe fn reset_raw(&mut self, ptr: *mut T) {
        if let Some(current) = self.ptr
            && ptr::addr_eq(current.as_ptr(), ptr)
        {
            return;
        }

        self.drop_current();

        self.ptr = NonNull::new(ptr);
        if self.ptr.is_some() {
            debug::acquired();
        }
    }

    /// Move-assigns from `other`.
    ///
    /// The instance held by `self` is torn down first, then `self` adopts
    /// the instance and the deleter of `other`. `other` is left empty with
    /// the previous deleter of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::ExclusiveOwner;
    ///
    /// let mut a = ExclusiveOwner::new(1);
    /// let mut b = ExclusiveOwner::new(2);
    ///
    /// b.assign(&mut a);
    /// assert!(a.is_empty());
    /// assert_eq!(*b, 1);
    /// ```
    pub fn assign(&mut self, other: &mut Self) {
        self.drop_current();
        self.ptr = other.ptr.take();
        mem::swap(&mut self.deleter, &mut other.deleter);
    }

    /// Moves the owned instance out of `self`, leaving `self` empty.
    ///
    /// This is the explicit move: afterwards `self` owns nothing and can
    /// still be used.
    #[inline]
    pub fn take(&mut self) -> Self
    where
        D: Default,
    {
        mem::replace(self, Self::empty_with(D::default()))
    }

    /// Swaps the instances and deleters of two owners.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns a reference to the deleter.
    #[inline(always)]
    pub const fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Returns a mutable reference to the deleter.
    #[inline(always)]
    pub const fn deleter_mut(&mut self) -> &mut D {
        &mut self.deleter
    }

    /// Splits the owner into its pointer and deleter without tearing down.
    #[inline]
    pub fn into_parts(mut self) -> (Option<NonNull<T>>, D) {
        let ptr = self.release();
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used or dropped again.
        let deleter = unsafe { ptr::read(&this.deleter) };
        (ptr, deleter)
    }
}

impl<T: ?Sized> ExclusiveOwner<T> {
    /// Creates an empty owner.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::ExclusiveOwner;
    ///
    /// let owner = ExclusiveOwner::<String>::empty();
    /// assert!(owner.is_empty());
    /// assert!(owner.as_ptr().is_null());
    /// ```
    #[inline]
    pub const fn empty() -> Self {
        Self::empty_with(DefaultDelete)
    }

    /// Takes ownership of a pointer produced by `Box::into_raw` or
    /// [`release`](Self::release).
    ///
    /// A null `ptr` yields an empty owner.
    ///
    /// # Safety
    ///
    /// - If non-null, `ptr` must come from a `Box<T>` or from an owner using
    ///   [`DefaultDelete`].
    /// - No other owner may adopt `ptr`.
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        Self::adopt(NonNull::new(ptr), DefaultDelete)
    }

    /// Converts the owner into a `Box`, or `None` if empty.
    #[inline]
    pub fn into_box(mut self) -> Option<Box<T>> {
        // SAFETY: pointers owned with `DefaultDelete` are `Box` allocations.
        self.disown().map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) })
    }
}

impl<T, D: Deleter<T>> ExclusiveOwner<T, D> {
    /// Returns the raw address of the owned instance, null if empty.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null(),
        }
    }

    /// Returns the raw mutable address of the owned instance, null if empty.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// Gives up ownership and returns the raw address, null if empty.
    ///
    /// The deleter is dropped without being called.
    #[inline]
    #[must_use = "the released instance is leaked unless it is adopted again"]
    pub fn into_raw(mut self) -> *mut T {
        match self.release() {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

impl<T> ExclusiveOwner<T> {
    /// Allocates `value` on the heap and owns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::ExclusiveOwner;
    ///
    /// let owner = ExclusiveOwner::new((1, "ipad"));
    /// assert_eq!(owner.0, 1);
    /// ```
    #[inline]
    pub fn new(value: T) -> Self {
        Self::new_with(|| value)
    }

    /// Reserves storage, then fills it with the value returned by `f`.
    ///
    /// If `f` panics, the storage is returned before unwinding continues.
    /// Aborts through [`handle_alloc_error`] if the allocation fails.
    pub fn new_with(f: impl FnOnce() -> T) -> Self {
        let Ok(slot) = RawSlot::allocate() else {
            handle_alloc_error(Layout::new::<T>())
        };
        Self::adopt(Some(slot.write(f())), DefaultDelete)
    }

    /// Like [`new`](Self::new), but reports allocation failure instead of
    /// aborting.
    #[inline]
    pub fn try_new(value: T) -> Result<Self, AllocError> {
        Self::try_new_with(|| Ok::<T, Infallible>(value)).map_err(AllocError::from)
    }

    /// Reserves storage, then fills it with the value built by `f`.
    ///
    /// If `f` fails (or panics) the storage is returned to the allocator before
    /// the failure reaches the caller, so no partial owner exists at any time.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::{ConstructError, ExclusiveOwner};
    ///
    /// let owner = ExclusiveOwner::try_new_with(|| "42".parse::<u32>()).unwrap();
    /// assert_eq!(*owner, 42);
    ///
    /// let err = ExclusiveOwner::try_new_with(|| "ipad".parse::<u32>()).unwrap_err();
    /// assert!(matches!(err, ConstructError::Construct(_)));
    /// ```
    pub fn try_new_with<E>(f: impl FnOnce() -> Result<T, E>) -> Result<Self, ConstructError<E>> {
        let slot = RawSlot::allocate()?;
        match f() {
            Ok(value) => Ok(Self::adopt(Some(slot.write(value)), DefaultDelete)),
            Err(e) => {
                log::warn!(
                    "ExclusiveOwner::try_new_with -> constructor of `{}` failed",
                    core::any::type_name::<T>(),
                );
                Err(ConstructError::Construct(e))
            }
        }
    }

    /// Moves the owned value out, leaving the owner empty.
    #[inline]
    pub fn into_inner(self) -> Option<T> {
        self.into_box().map(|boxed| *boxed)
    }

    /// Puts `value` in the owner and returns the previous value, if any.
    ///
    /// An owning owner reuses its storage, an empty one allocates.
    pub fn replace(&mut self, value: T) -> Option<T> {
        match self.as_mut() {
            Some(current) => Some(mem::replace(current, value)),
            None => {
                *self = Self::new(value);
                None
            }
        }
    }
}

/// Allocates `value` and returns its owner.
///
/// Shorthand for [`ExclusiveOwner::new`].
///
/// # Examples
///
/// ```
/// use solo_ptr::make_exclusive;
///
/// let owner = make_exclusive(String::from("smartwatch"));
/// assert_eq!(owner.len(), 10);
/// ```
#[inline]
pub fn make_exclusive<T>(value: T) -> ExclusiveOwner<T> {
    ExclusiveOwner::new(value)
}

// -----------------------------------------------------------------------------
// Traits

impl<T: ?Sized, D: Deleter<T> + Default> Default for ExclusiveOwner<T, D> {
    #[inline]
    fn default() -> Self {
        Self::empty_with(D::default())
    }
}

impl<T: ?Sized> From<Box<T>> for ExclusiveOwner<T> {
    #[inline]
    fn from(value: Box<T>) -> Self {
        Self::adopt(Some(NonNull::from(Box::leak(value))), DefaultDelete)
    }
}

impl<T: ?Sized, D: Deleter<T>> Deref for ExclusiveOwner<T, D> {
    type Target = T;

    #[inline]
    #[track_caller]
    fn deref(&self) -> &T {
        match self.ptr {
            // SAFETY: an owned pointer is valid and not aliased mutably.
            Some(ptr) => unsafe { ptr.as_ref() },
            None => empty_deref(),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> DerefMut for ExclusiveOwner<T, D> {
    #[inline]
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.ptr {
            // SAFETY: an owned pointer is valid and `&mut self` is exclusive.
            Some(mut ptr) => unsafe { ptr.as_mut() },
            None => empty_deref(),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> fmt::Pointer for ExclusiveOwner<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr {
            Some(ptr) => fmt::Pointer::fmt(&ptr, f),
            None => fmt::Pointer::fmt(&ptr::null::<u8>(), f),
        }
    }
}

impl<T: ?Sized + fmt::Debug, D: Deleter<T>> fmt::Debug for ExclusiveOwner<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            Some(value) => f.debug_tuple("ExclusiveOwner").field(&value).finish(),
            None => f.write_str("ExclusiveOwner(<empty>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExclusiveOwner, make_exclusive};
    use crate::{ConstructError, Deleter};

    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use core::ptr::NonNull;

    // -------------------------------------------------------------------------
    // Fixtures

    type Log = Rc<RefCell<Vec<String>>>;

    struct Gadget {
        id: i32,
        name: String,
        log: Log,
    }

    impl Gadget {
        fn new(id: i32, name: &str, log: &Log) -> Self {
            log.borrow_mut().push(format!("Gadget({id}, {name})"));
            Self {
                id,
                name: name.into(),
                log: log.clone(),
            }
        }

        fn use_it(&self) {
            self.log.borrow_mut().push(format!("Using Gadget({})", self.id));
        }
    }

    impl Drop for Gadget {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("~Gadget({})", self.id));
        }
    }

    #[derive(Debug)]
    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    // -------------------------------------------------------------------------
    // State

    #[test]
    fn owning_and_empty() {
        let owner = ExclusiveOwner::new(1);
        assert!(owner.is_owning());
        assert!(!owner.is_empty());
        assert!(!owner.as_ptr().is_null());

        let empty = ExclusiveOwner::<i32>::empty();
        assert!(!empty.is_owning());
        assert!(empty.is_empty());
        assert!(empty.get().is_none());

        let default: ExclusiveOwner<i32> = Default::default();
        assert!(default.is_empty());

        let null = unsafe { ExclusiveOwner::<i32>::from_raw(core::ptr::null_mut()) };
        assert!(null.is_empty());
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut a = make_exclusive(String::from("ipad"));
        let addr = a.as_ptr();

        let b = a.take();
        assert!(a.is_empty());
        assert!(b.is_owning());
        assert_eq!(b.as_ptr(), addr);
        assert_eq!(*b, "ipad");

        let mut empty = ExclusiveOwner::<String>::empty();
        assert!(empty.take().is_empty());
    }

    #[test]
    fn self_assignment_is_noop() {
        let drops = Rc::new(Cell::new(0));
        let mut a = ExclusiveOwner::new(Counted(drops.clone()));
        let addr = a.as_mut_ptr();

        // Moving out and back in through the same binding.
        let mut moved = a.take();
        a.assign(&mut moved);
        assert_eq!(a.as_mut_ptr(), addr);

        // Re-adopting the pointer it already owns.
        unsafe { a.reset_raw(addr) };
        assert!(a.is_owning());
        assert_eq!(a.as_mut_ptr(), addr);
        assert_eq!(drops.get(), 0);

        drop(a);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn assign_drops_previous_once() {
        let x_drops = Rc::new(Cell::new(0));
        let y_drops = Rc::new(Cell::new(0));

        let mut a = ExclusiveOwner::new(Counted(x_drops.clone()));
        let mut b = ExclusiveOwner::new(Counted(y_drops.clone()));
        let x_addr = a.as_ptr();

        b.assign(&mut a);
        assert_eq!(y_drops.get(), 1);
        assert_eq!(x_drops.get(), 0);
        assert!(a.is_empty());
        assert_eq!(b.as_ptr(), x_addr);

        drop(a);
        assert_eq!(x_drops.get(), 0);
        drop(b);
        assert_eq!(x_drops.get(), 1);
        assert_eq!(y_drops.get(), 1);
    }

    #[test]
    fn drop_runs_destructor_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let _owner = ExclusiveOwner::new(Counted(drops.clone()));
            let _empty = ExclusiveOwner::<Counted>::empty();
        }
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn release_does_not_drop() {
        let drops = Rc::new(Cell::new(0));
        let mut owner = ExclusiveOwner::new(Counted(drops.clone()));
        let addr = owner.as_mut_ptr();

        let released = owner.release().unwrap();
        assert_eq!(released.as_ptr(), addr);
        assert!(owner.is_empty());
        assert!(owner.release().is_none());

        drop(owner);
        assert_eq!(drops.get(), 0);

        drop(unsafe { ExclusiveOwner::from_raw(released.as_ptr()) });
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn reset_and_reset_raw() {
        let drops = Rc::new(Cell::new(0));
        let mut owner = ExclusiveOwner::new(Counted(drops.clone()));

        owner.reset();
        assert!(owner.is_empty());
        assert_eq!(drops.get(), 1);
        owner.reset();
        assert_eq!(drops.get(), 1);

        let other = ExclusiveOwner::new(Counted(drops.clone())).into_raw();
        unsafe { owner.reset_raw(other) };
        assert_eq!(owner.as_mut_ptr(), other);

        unsafe { owner.reset_raw(core::ptr::null_mut()) };
        assert!(owner.is_empty());
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn replace_and_into_inner() {
        let mut owner = ExclusiveOwner::<i32>::empty();
        assert_eq!(owner.replace(1), None);
        let addr = owner.as_ptr();

        assert_eq!(owner.replace(2), Some(1));
        assert_eq!(owner.as_ptr(), addr);
        assert_eq!(owner.into_inner(), Some(2));

        assert_eq!(ExclusiveOwner::<i32>::empty().into_inner(), None);
    }

    #[test]
    fn box_round_trip() {
        let owner = ExclusiveOwner::from(alloc::boxed::Box::new(String::from("ipad")));
        let boxed = owner.into_box().unwrap();
        assert_eq!(*boxed, "ipad");
    }

    #[test]
    #[should_panic = "dereferenced an empty ExclusiveOwner"]
    fn deref_empty_panics() {
        let owner = ExclusiveOwner::<i32>::empty();
        let _value: i32 = *owner;
    }

    #[test]
    fn checked_access() {
        let mut owner = ExclusiveOwner::new(10);
        *owner.as_mut().unwrap() += 1;
        assert_eq!(owner.as_ref(), Some(&11));
        assert_eq!(unsafe { *owner.as_ref_unchecked() }, 11);

        owner.reset();
        assert_eq!(owner.as_ref(), None);
        assert_eq!(owner.as_mut(), None);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", ExclusiveOwner::new(3)), "ExclusiveOwner(3)");
        assert_eq!(
            format!("{:?}", ExclusiveOwner::<i32>::empty()),
            "ExclusiveOwner(<empty>)"
        );
    }

    // -------------------------------------------------------------------------
    // Construction

    #[test]
    fn try_new_with_propagates_error() {
        let drops = Rc::new(Cell::new(0));
        let built = drops.clone();

        let err = ExclusiveOwner::<Counted>::try_new_with(|| {
            let _partial = Counted(built);
            Err::<Counted, &str>("out of gadgets")
        })
        .unwrap_err();

        assert_eq!(err, ConstructError::Construct("out of gadgets"));
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn panicking_constructor_propagates() {
        let result = std::panic::catch_unwind(|| {
            ExclusiveOwner::<String>::new_with(|| panic!("constructor failed"))
        });
        assert!(result.is_err());

        let result = std::panic::catch_unwind(|| {
            ExclusiveOwner::<String>::try_new_with(|| -> Result<String, ()> {
                panic!("constructor failed")
            })
        });
        assert!(result.is_err());
    }

    #[test]
    fn try_new_succeeds() {
        let owner = ExclusiveOwner::try_new([7u8; 64]).unwrap();
        assert_eq!(owner[63], 7);

        let unit = ExclusiveOwner::try_new(()).unwrap();
        assert!(unit.is_owning());
    }

    // -------------------------------------------------------------------------
    // Deleters

    #[test]
    fn custom_deleter_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let deleter = move |p: NonNull<i32>| {
            counter.set(counter.get() + 1);
            drop(unsafe { alloc::boxed::Box::from_raw(p.as_ptr()) });
        };

        let raw = alloc::boxed::Box::into_raw(alloc::boxed::Box::new(5));
        let mut owner = unsafe { ExclusiveOwner::with_deleter(raw, deleter) };
        assert_eq!(*owner, 5);

        owner.reset();
        owner.reset();
        drop(owner);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn custom_deleter_skipped_after_release() {
        let calls = Rc::new(Cell::new(0));

        struct Recycle(Rc<Cell<usize>>);

        impl Deleter<i32> for Recycle {
            unsafe fn delete(&mut self, _: NonNull<i32>) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut value = 9;
        let owner = unsafe { ExclusiveOwner::with_deleter(&raw mut value, Recycle(calls.clone())) };
        let (ptr, deleter) = owner.into_parts();
        assert_eq!(ptr.map(NonNull::as_ptr), Some(&raw mut value));
        drop(deleter);
        assert_eq!(calls.get(), 0);

        let owner = unsafe { ExclusiveOwner::with_deleter(&raw mut value, Recycle(calls.clone())) };
        drop(owner);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn assign_moves_deleter() {
        struct Tagged(u8, Rc<Cell<u8>>);

        impl Deleter<u8> for Tagged {
            unsafe fn delete(&mut self, _: NonNull<u8>) {
                self.1.set(self.0);
            }
        }

        let last = Rc::new(Cell::new(0));
        let (mut x, mut y) = (1u8, 2u8);

        let mut a = unsafe { ExclusiveOwner::with_deleter(&raw mut x, Tagged(1, last.clone())) };
        let mut b = unsafe { ExclusiveOwner::with_deleter(&raw mut y, Tagged(2, last.clone())) };

        a.assign(&mut b);
        assert_eq!(last.get(), 1);
        assert_eq!(a.deleter().0, 2);
        assert_eq!(b.deleter().0, 1);

        drop(a);
        assert_eq!(last.get(), 2);
    }

    // -------------------------------------------------------------------------
    // Scenario

    #[test]
    fn gadget_lifecycle() {
        let log = new_log();
        {
            let mut p1 = ExclusiveOwner::new(Gadget::new(1, "ipad", &log));
            p1.use_it();

            let mut next = ExclusiveOwner::new(Gadget::new(2, "smartwatch", &log));
            p1.assign(&mut next);
            assert_eq!(p1.name, "smartwatch");

            let p2 = p1.take();
            assert!(p1.is_empty());
            p2.use_it();
        }

        assert_eq!(
            *log.borrow(),
            [
                "Gadget(1, ipad)",
                "Using Gadget(1)",
                "Gadget(2, smartwatch)",
                "~Gadget(1)",
                "Using Gadget(2)",
                "~Gadget(2)",
            ]
        );
    }

    #[test]
    fn owner_member_moves_with_its_holder() {
        struct Holder {
            name: String,
            gadget: ExclusiveOwner<Gadget>,
        }

        impl Holder {
            fn describe(&self) -> Option<String> {
                let gadget = self.gadget.as_ref()?;
                Some(format!("{} is using {}", self.name, gadget.name))
            }
        }

        let log = new_log();
        let first = Holder {
            name: "Jan".into(),
            gadget: make_exclusive(Gadget::new(665, "ipad", &log)),
        };
        let second = first;
        assert_eq!(second.describe().as_deref(), Some("Jan is using ipad"));

        drop(second);
        assert_eq!(log.borrow().last().map(String::as_str), Some("~Gadget(665)"));
    }

    #[test]
    fn is_send_sync() {
        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}

        is_send::<ExclusiveOwner<i32>>();
        is_sync::<ExclusiveOwner<i32>>();
        is_send::<ExclusiveOwner<[String]>>();
        is_sync::<ExclusiveOwner<[String]>>();
    }
}
